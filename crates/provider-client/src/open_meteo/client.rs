use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use super::types::{describe_weather_code, ForecastResponse, GeocodeResponse, GeocodeResult};
use crate::adapter::SourceAdapter;
use crate::types::{FetchOutcome, FetchRequest, ProviderResult, SourceCategory};

const GEOCODE_BASE: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_BASE: &str = "https://api.open-meteo.com/v1/forecast";

pub const NAME: &str = "Open-Meteo";
const WEIGHT: u8 = 95;

#[derive(Debug)]
pub struct OpenMeteoClient {
    http: Client,
}

impl Default for OpenMeteoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenMeteoClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            http: crate::build_http_client(),
        }
    }

    /// Best geocoding match for a free-form place name.
    #[instrument(name = "open_meteo.geocode", skip(self))]
    pub async fn geocode(&self, place: &str) -> Result<Option<GeocodeResult>> {
        let url = format!(
            "{GEOCODE_BASE}?name={}&count=1",
            urlencoding::encode(place)
        );
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to geocode location")?;

        if !response.status().is_success() {
            anyhow::bail!("Geocoding request failed: {}", response.status());
        }

        let mut decoded = response
            .json::<GeocodeResponse>()
            .await
            .context("Failed to decode geocoding response")?;
        Ok(if decoded.results.is_empty() {
            None
        } else {
            Some(decoded.results.remove(0))
        })
    }

    /// Current conditions at the given coordinates.
    #[instrument(name = "open_meteo.forecast", skip(self))]
    pub async fn current_weather(&self, latitude: f64, longitude: f64) -> Result<ForecastResponse> {
        let url = format!(
            "{FORECAST_BASE}?latitude={latitude}&longitude={longitude}&current_weather=true&timezone=auto"
        );
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to fetch weather forecast")?;

        if !response.status().is_success() {
            anyhow::bail!("Forecast request failed: {}", response.status());
        }

        response
            .json::<ForecastResponse>()
            .await
            .context("Failed to decode forecast response")
    }

    fn decode(place: &GeocodeResult, forecast: &ForecastResponse) -> FetchOutcome {
        let Some(current) = forecast.current_weather.as_ref() else {
            return FetchOutcome::Malformed;
        };

        let mut label = place.name.clone().unwrap_or_else(|| "Unknown".to_string());
        if let Some(country) = place.country.as_deref() {
            label.push_str(", ");
            label.push_str(country);
        }

        let conditions = current
            .weathercode
            .map_or("Unknown conditions", describe_weather_code);
        let mut payload = format!("{label}: {}\u{b0}C, {conditions}", current.temperature);
        if let Some(wind) = current.windspeed {
            payload.push_str(&format!(", wind {wind} km/h"));
        }

        FetchOutcome::Hit(ProviderResult::new(NAME, payload, WEIGHT))
    }
}

#[async_trait]
impl SourceAdapter for OpenMeteoClient {
    fn name(&self) -> &'static str {
        NAME
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::Weather
    }

    fn weight(&self) -> u8 {
        WEIGHT
    }

    #[instrument(name = "open_meteo.fetch", skip(self, request))]
    async fn fetch(&self, request: &FetchRequest) -> Option<ProviderResult> {
        let location = request.location.as_deref()?;

        let place = match self.geocode(location).await {
            Ok(Some(place)) => place,
            Ok(None) => {
                debug!(location, "no geocoding match");
                return None;
            }
            Err(error) => {
                debug!(location, error = %error, "geocoding failed");
                return None;
            }
        };

        let forecast = match self.current_weather(place.latitude, place.longitude).await {
            Ok(forecast) => forecast,
            Err(error) => {
                debug!(location, error = %error, "forecast fetch failed");
                return None;
            }
        };

        Self::decode(&place, &forecast).hit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::open_meteo::types::CurrentWeather;

    fn tokyo() -> GeocodeResult {
        GeocodeResult {
            latitude: 35.69,
            longitude: 139.69,
            name: Some("Tokyo".to_string()),
            country: Some("Japan".to_string()),
        }
    }

    #[test]
    fn decodes_current_conditions() {
        let forecast = ForecastResponse {
            current_weather: Some(CurrentWeather {
                temperature: 21.4,
                windspeed: Some(13.0),
                weathercode: Some(2),
            }),
        };
        let result = OpenMeteoClient::decode(&tokyo(), &forecast).hit().expect("hit");
        assert_eq!(result.payload, "Tokyo, Japan: 21.4\u{b0}C, Partly cloudy, wind 13 km/h");
        assert_eq!(result.confidence, 95);
    }

    #[test]
    fn missing_current_weather_is_malformed() {
        let forecast = ForecastResponse {
            current_weather: None,
        };
        assert!(matches!(
            OpenMeteoClient::decode(&tokyo(), &forecast),
            FetchOutcome::Malformed
        ));
    }

    #[test]
    fn weather_codes_cover_common_conditions() {
        assert_eq!(describe_weather_code(0), "Clear sky");
        assert_eq!(describe_weather_code(63), "Rain");
        assert_eq!(describe_weather_code(95), "Thunderstorm");
        assert_eq!(describe_weather_code(42), "Unknown conditions");
    }
}
