//! Reshapes Open-Meteo's parallel `hourly.time` / `hourly.temperature_2m` arrays.

use serde::Deserialize;
use serde_json::Value;

use crate::model::{ReadingEntry, TemperatureReading, WeatherInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeStatus {
    Success,
    MalformedShape,
}

impl ShapeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeStatus::Success => "success",
            ShapeStatus::MalformedShape => "success_malformed_shape",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub info: WeatherInfo,
    pub shape: ShapeStatus,
}

#[derive(Debug, Deserialize)]
struct OmForecast {
    hourly: OmHourly,
}

#[derive(Debug, Deserialize)]
struct OmHourly {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
}

/// Map a provider body to readings. Never fails: an unexpected shape becomes a
/// single error marker entry.
pub fn hourly_readings(body: &Value) -> Transformed {
    let hourly = match OmForecast::deserialize(body) {
        Ok(forecast) if forecast.hourly.time.len() == forecast.hourly.temperature_2m.len() => {
            forecast.hourly
        }
        _ => {
            return Transformed {
                info: WeatherInfo { temperature_readings: vec![ReadingEntry::malformed_shape()] },
                shape: ShapeStatus::MalformedShape,
            };
        }
    };

    let temperature_readings = hourly
        .time
        .into_iter()
        .zip(hourly.temperature_2m)
        .map(|(time, temp)| {
            ReadingEntry::Reading(TemperatureReading { time, temperature: temp.into() })
        })
        .collect();

    Transformed {
        info: WeatherInfo { temperature_readings },
        shape: ShapeStatus::Success,
    }
}
