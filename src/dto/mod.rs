pub mod donation_dto;
pub mod history_dto;
pub mod quiz_dto;
pub mod vendor_dto;

use serde::{Deserialize, Deserializer};

/// Tells a missing field (`None`) from an explicit `null` (`Some(None)`).
/// Pair with `#[serde(default)]` so absent fields skip this function.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
