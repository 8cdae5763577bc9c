use std::fmt;
use std::ops::Deref;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::DecodeError;
use super::Value;

/// [`Value`] decoded from a JSON payload.
///
/// ```ignore
/// #[derive(Default, Serialize, Deserialize)]
/// struct Settings {
///     timeout_ms: u64,
/// }
///
/// let watch = watcher.add_watch("service/settings", JsonValue::<Settings>::default).await?;
/// let timeout_ms = watch.value().timeout_ms;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonValue<T>(T);

impl<T> JsonValue<T> {
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for JsonValue<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> fmt::Display for JsonValue<T>
where
    T: Serialize,
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let json = serde_json::to_string(&self.0).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl<T> Value for JsonValue<T>
where
    T: DeserializeOwned + Serialize + Send + Sync + 'static,
{
    fn decode(
        &mut self,
        data: &[u8],
    ) -> Result<(), DecodeError> {
        self.0 = serde_json::from_slice(data)?;
        Ok(())
    }
}
