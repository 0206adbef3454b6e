use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

/// One geocoding match reduced to its address components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
}

/// Response body of the geocode proxy; everything else the provider returns is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeocodeResponse {
    pub results: Vec<GeocodeResult>,
}
