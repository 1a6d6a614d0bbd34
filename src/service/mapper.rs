//! Map pipeline: geocode the member list and write the map page.

use anyhow::Context;
use std::path::{Path, PathBuf};

use crate::domain::models::{is_blank_cell, CompanyLocation, GeocodeSummary, MapSettings};
use crate::error::{AppError, Result};
use crate::render::MapPage;
use crate::repository::Sheet;
use crate::service::geocoder::Geocoder;

pub const DEFAULT_MAP_OUTPUT: &str = "member_map.html";

/// Steps for getting a working key, logged when the probe fails.
const SETUP_CHECKLIST: [&str; 4] = [
    "1. Create or select a project at https://console.cloud.google.com",
    "2. Enable the Maps JavaScript API and the Geocoding API",
    "3. Create an API key and pass it with --api-key or GOOGLE_MAPS_API_KEY",
    "4. Register billing information (a monthly free credit applies)",
];

pub fn log_setup_checklist() {
    log::warn!("[MAP] Google Maps API is not usable. Check the following:");
    for step in SETUP_CHECKLIST {
        log::warn!("[MAP]   {}", step);
    }
}

pub struct MapBuilder {
    geocoder: Geocoder,
    settings: MapSettings,
}

impl MapBuilder {
    pub fn new(settings: MapSettings) -> Result<Self> {
        Ok(Self {
            geocoder: Geocoder::new(&settings)?,
            settings,
        })
    }

    /// Company-name and address column indices.
    fn required_columns(&self, sheet: &Sheet) -> Result<(usize, usize)> {
        let columns = &self.settings.columns;
        Ok((
            sheet.require_column(&columns.company)?,
            sheet.require_column(&columns.address)?,
        ))
    }

    /// Geocode every row that has both a company name and an address.
    pub async fn collect_locations(
        &self,
        sheet: &Sheet,
    ) -> Result<(Vec<CompanyLocation>, GeocodeSummary)> {
        let (name_col, address_col) = self.required_columns(sheet)?;

        let total = sheet.len();
        let mut locations = Vec::new();
        let mut summary = GeocodeSummary::default();

        for row in 0..total {
            let name = sheet.get(row, name_col).trim();
            let address = sheet.get(row, address_col).trim();
            if is_blank_cell(name) || is_blank_cell(address) {
                summary.skipped += 1;
                continue;
            }

            log::info!("[MAP] {}/{}: {}", row + 1, total, name);
            log::info!("[MAP]   address: {}", address);

            match self.geocoder.geocode(address).await {
                Some(coords) => {
                    log::info!("[MAP]   located at ({:.6}, {:.6})", coords.lat, coords.lng);
                    locations.push(CompanyLocation::new(name, address, coords));
                    summary.succeeded += 1;
                }
                None => {
                    log::warn!("[MAP]   could not geocode this address");
                    summary.failed += 1;
                }
            }
        }

        log::info!(
            "[MAP] Geocoding finished: {} succeeded, {} failed, {} skipped",
            summary.succeeded,
            summary.failed,
            summary.skipped
        );
        Ok((locations, summary))
    }

    /// Probe the API, geocode the sheet and write the page to `output`.
    #[tracing::instrument(skip(self, sheet))]
    pub async fn build(&self, sheet: &Sheet, output: &Path) -> Result<GeocodeSummary> {
        self.required_columns(sheet)?;
        if let Err(e) = self.geocoder.test_connection().await {
            log::error!("[MAP] API connection test failed: {}", e);
            log_setup_checklist();
            return Err(e);
        }

        let (locations, summary) = self.collect_locations(sheet).await?;
        if locations.is_empty() {
            return Err(AppError::NoLocations);
        }

        let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M").to_string();
        let page = MapPage {
            title: &self.settings.title,
            api_key: &self.settings.api_key,
            generated_at: &generated_at,
        };
        std::fs::write(output, page.render(&locations)?)
            .with_context(|| format!("Failed to write map page {}", output.display()))?;
        log::info!("[MAP] Map page written to {}", output.display());
        Ok(summary)
    }
}

/// Load the member list and render its map. Returns the path written.
pub async fn run(input: &Path, output: Option<&Path>, settings: MapSettings) -> Result<PathBuf> {
    log::info!("[MAP] Building member map from {}", input.display());
    if !settings.has_usable_key() {
        log_setup_checklist();
        return Err(AppError::MissingApiKey);
    }

    let sheet = Sheet::load(input)?;
    let builder = MapBuilder::new(settings)?;

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MAP_OUTPUT));
    builder.build(&sheet, &output).await?;
    log::info!("[MAP] All done, open {} in a browser", output.display());
    Ok(output)
}
