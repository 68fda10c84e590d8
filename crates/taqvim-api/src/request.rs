//! The request document accepted by `POST /calendar` and its dispatch.
//!
//! | `operation`  | Fields | Result |
//! |--------------|--------|--------|
//! | `months`     | `id?`, `name?` | `[Month]` with nested days |
//! | `days`       | `id?`, `dayName?`, `localDate?` | `[Day]` with nested slots |
//! | `slots`      | `id?`, `hour?` | `[Slot]` with note and tags |
//! | `notes`      | `slotId` | `[Note]` (zero or one) |
//! | `upsertNote` | `slotId`, `text` | `Note` |
//! | `upsertTags` | `slotId`, `tagNames` | `[Tag]` |

use axum::{Json, body::Bytes, extract::State};
use serde::{Deserialize, Serialize};
use taqvim_core::{
  calendar::{
    DayFilter, DayId, DayView, MonthFilter, MonthId, MonthView, Note, SlotFilter,
    SlotId, SlotView, Tag,
  },
  store::CalendarStore,
};

use crate::{ApiState, error::ApiError};

// ─── Request ─────────────────────────────────────────────────────────────────

/// One query or mutation, tagged by its `operation` field.
///
/// Omitted filters match everything; given filters must all match.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(
  tag = "operation",
  rename_all = "camelCase",
  rename_all_fields = "camelCase"
)]
pub enum CalendarRequest {
  Months {
    id:   Option<MonthId>,
    name: Option<String>,
  },
  Days {
    id:         Option<DayId>,
    day_name:   Option<String>,
    #[serde(alias = "jalaliDate")]
    local_date: Option<String>,
  },
  Slots {
    id:   Option<SlotId>,
    hour: Option<u8>,
  },
  Notes {
    slot_id: SlotId,
  },
  UpsertNote {
    slot_id: SlotId,
    /// Required; an explicit `null` clears the text.
    #[serde(deserialize_with = "Option::deserialize")]
    text:    Option<String>,
  },
  UpsertTags {
    slot_id:   SlotId,
    tag_names: Vec<String>,
  },
}

impl CalendarRequest {
  /// The wire name of the operation, for logging.
  pub fn operation(&self) -> &'static str {
    match self {
      CalendarRequest::Months { .. } => "months",
      CalendarRequest::Days { .. } => "days",
      CalendarRequest::Slots { .. } => "slots",
      CalendarRequest::Notes { .. } => "notes",
      CalendarRequest::UpsertNote { .. } => "upsertNote",
      CalendarRequest::UpsertTags { .. } => "upsertTags",
    }
  }

  pub fn is_mutation(&self) -> bool {
    matches!(self, CalendarRequest::UpsertNote { .. } | CalendarRequest::UpsertTags { .. })
  }
}

// ─── Response ────────────────────────────────────────────────────────────────

/// The result of a single operation, serialised without a discriminant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CalendarData {
  Months(Vec<MonthView>),
  Days(Vec<DayView>),
  Slots(Vec<SlotView>),
  Notes(Vec<Note>),
  Note(Note),
  Tags(Vec<Tag>),
}

/// `{"data": ...}`
#[derive(Debug, Serialize)]
pub struct Envelope {
  pub data: CalendarData,
}

// ─── Dispatch ────────────────────────────────────────────────────────────────

/// Run `request` against the query or mutation service.
pub async fn dispatch<S>(state: &ApiState<S>, request: CalendarRequest) -> Result<CalendarData, ApiError>
where
  S: CalendarStore,
{
  let data = match request {
    CalendarRequest::Months { id, name } => {
      CalendarData::Months(state.queries.months(&MonthFilter { id, name }).await?)
    }
    CalendarRequest::Days { id, day_name, local_date } => {
      let filter = DayFilter { id, day_name, jalali_date: local_date };
      CalendarData::Days(state.queries.days(&filter).await?)
    }
    CalendarRequest::Slots { id, hour } => {
      CalendarData::Slots(state.queries.slots(&SlotFilter { id, hour }).await?)
    }
    CalendarRequest::Notes { slot_id } => CalendarData::Notes(state.queries.notes(slot_id).await?),
    CalendarRequest::UpsertNote { slot_id, text } => {
      CalendarData::Note(state.mutations.upsert_note(slot_id, text).await?)
    }
    CalendarRequest::UpsertTags { slot_id, tag_names } => {
      CalendarData::Tags(state.mutations.upsert_tags(slot_id, tag_names).await?)
    }
  };
  Ok(data)
}

/// `POST /calendar`
///
/// The body is decoded here rather than through the `Json` extractor so that
/// every decoding failure takes the same `invalid_request` shape.
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  body: Bytes,
) -> Result<Json<Envelope>, ApiError>
where
  S: CalendarStore + 'static,
{
  let request: CalendarRequest =
    serde_json::from_slice(&body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

  tracing::debug!(
    operation = request.operation(),
    mutation = request.is_mutation(),
    "dispatching calendar request"
  );
  let data = dispatch(&state, request).await?;
  Ok(Json(Envelope { data }))
}
