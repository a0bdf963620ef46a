//! Acquisition of the source datasets into the static directory.

/// Certificate dump as served by the open-data portal.
pub(crate) const RAW_DATA_FILE: &str = "raw_data.json";
/// Flat income-indicator table assembled from the INE series.
pub(crate) const INCOME_FILE: &str = "income.json";
/// Municipal population entries from the Idescat service.
pub(crate) const POB_FILE: &str = "municipis.json";

#[cfg(feature = "download")]
mod certificates;
#[cfg(feature = "download")]
mod http;
#[cfg(feature = "download")]
mod idescat;
#[cfg(feature = "download")]
mod ine;

#[cfg(feature = "download")]
pub(crate) use certificates::*;
#[cfg(feature = "download")]
pub(crate) use http::*;
#[cfg(feature = "download")]
pub(crate) use idescat::*;
#[cfg(feature = "download")]
pub(crate) use ine::*;
