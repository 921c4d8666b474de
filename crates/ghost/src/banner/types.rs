/// Wire types for Banner's class search responses
///
/// Banner sends `null` for many fields that are usually strings, arrays or
/// booleans, so most fields go through `null_default`.
use serde::{Deserialize, Deserializer, Serialize};

/// Treats an explicit `null` the same as a missing field.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Envelope returned by `searchResults/searchResults`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "null_default")]
    pub success: bool,

    #[serde(default, deserialize_with = "null_default")]
    pub total_count: u32,

    #[serde(default, deserialize_with = "null_default")]
    pub data: Vec<RawSection>,
}

/// One item of the `data` array: a single section offering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSection {
    #[serde(default, deserialize_with = "null_default")]
    pub term: String,

    #[serde(default, deserialize_with = "null_default")]
    pub course_reference_number: String,

    #[serde(default, deserialize_with = "null_default")]
    pub subject: String,

    #[serde(default, deserialize_with = "null_default")]
    pub course_number: String,

    #[serde(default, deserialize_with = "null_default")]
    pub sequence_number: String,

    #[serde(default, deserialize_with = "null_default")]
    pub course_title: String,

    #[serde(default, deserialize_with = "null_default")]
    pub faculty: Vec<RawFaculty>,

    #[serde(default, deserialize_with = "null_default")]
    pub meetings_faculty: Vec<RawMeetingsFaculty>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFaculty {
    pub display_name: Option<String>,
    pub email_address: Option<String>,
}

/// A meeting-time block together with the faculty teaching it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMeetingsFaculty {
    pub meeting_time: Option<RawMeetingTime>,

    #[serde(default, deserialize_with = "null_default")]
    pub faculty: Vec<RawFaculty>,
}

/// Times are `HHMM` strings, e.g. `"1030"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMeetingTime {
    pub begin_time: Option<String>,
    pub end_time: Option<String>,
    pub building: Option<String>,
    pub room: Option<String>,

    #[serde(default, deserialize_with = "null_default")]
    pub sunday: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub monday: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub tuesday: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub wednesday: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub thursday: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub friday: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub saturday: bool,
}

/// Entry of `classSearch/get_subject`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSubject {
    pub code: String,
    #[serde(default)]
    pub description: String,
}
