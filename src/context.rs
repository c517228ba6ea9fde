//! Bounded context assembly for downstream prompts.
//!
//! Nothing unbounded may reach the language model: payloads with a
//! recognizable expense array are capped by record count, anything else by raw
//! character count, and absent data produces no context at all rather than an
//! error. The envelope always carries a truncation flag so the consumer knows
//! when data was cut.

// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, error::SerializationError};

/// Default cap on embedded expense records.
pub const DEFAULT_MAX_RECORDS: usize = 20;
/// Default cap on raw fallback payloads, in characters.
pub const DEFAULT_MAX_RAW_CHARS: usize = 50_000;

const RAW_TRUNCATION_MARKER: &str = "…";

/// Size caps enforced by [`ContextAssembler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextLimits {
	/// Maximum number of expense records embedded in the envelope.
	pub max_records: usize,
	/// Maximum number of characters kept from an unrecognizable payload.
	pub max_raw_chars: usize,
}
impl Default for ContextLimits {
	fn default() -> Self {
		Self { max_records: DEFAULT_MAX_RECORDS, max_raw_chars: DEFAULT_MAX_RAW_CHARS }
	}
}

/// Prompt-safe JSON envelope with enforced size bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundedContext {
	payload: String,
	truncated: bool,
}
impl BoundedContext {
	/// Serialized JSON envelope.
	pub fn as_str(&self) -> &str {
		&self.payload
	}

	/// Whether input data was cut to fit the caps.
	pub fn truncated(&self) -> bool {
		self.truncated
	}

	/// Consumes the envelope, returning the serialized payload.
	pub fn into_string(self) -> String {
		self.payload
	}
}
impl AsRef<str> for BoundedContext {
	fn as_ref(&self) -> &str {
		self.as_str()
	}
}

/// Shapes fetched resource data into prompt-safe envelopes.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContextAssembler {
	limits: ContextLimits,
}
impl ContextAssembler {
	/// Creates an assembler with custom limits.
	pub fn new(limits: ContextLimits) -> Self {
		Self { limits }
	}

	/// Size caps currently in force.
	pub fn limits(&self) -> ContextLimits {
		self.limits
	}

	/// Assembles a bounded envelope from a raw provider payload.
	///
	/// Absent input yields `Ok(None)`: downstream treats it as "no additional
	/// data available", not an error. An unparseable payload degrades to the
	/// capped raw fallback instead of failing.
	pub fn assemble(&self, payload: Option<&str>) -> Result<Option<BoundedContext>> {
		let Some(payload) = payload else {
			return Ok(None);
		};

		if let Ok(value) = serde_json::from_str::<Value>(payload)
			&& let Some(records) = recognize_records(&value)
		{
			return self.assemble_records(records).map(Some);
		}

		self.assemble_raw(payload).map(Some)
	}

	/// Caps an already-parsed record list (e.g. the connector's primed cache).
	///
	/// Records are assumed newest-first, matching the provider's listing
	/// order, so the cap keeps the most recent entries.
	pub fn assemble_records(&self, records: &[Value]) -> Result<BoundedContext> {
		let kept = records.len().min(self.limits.max_records);
		let truncated = records.len() > kept;
		let envelope = RecordEnvelope {
			expenses: &records[..kept],
			truncated,
			omitted: truncated.then_some(records.len() - kept),
		};
		let payload = serialize_envelope(&envelope)?;

		Ok(BoundedContext { payload, truncated })
	}

	fn assemble_raw(&self, payload: &str) -> Result<BoundedContext> {
		let truncated = payload.chars().count() > self.limits.max_raw_chars;
		let raw = if truncated {
			let mut capped: String = payload.chars().take(self.limits.max_raw_chars).collect();

			capped.push_str(RAW_TRUNCATION_MARKER);

			capped
		} else {
			payload.to_owned()
		};
		let envelope = RawEnvelope { raw: &raw, truncated };
		let payload = serialize_envelope(&envelope)?;

		Ok(BoundedContext { payload, truncated })
	}
}

#[derive(Serialize)]
struct RecordEnvelope<'a> {
	expenses: &'a [Value],
	truncated: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	omitted: Option<usize>,
}

#[derive(Serialize)]
struct RawEnvelope<'a> {
	raw: &'a str,
	truncated: bool,
}

fn serialize_envelope<E>(envelope: &E) -> Result<String>
where
	E: Serialize,
{
	serde_json::to_string(envelope)
		.map_err(|source| SerializationError::ContextEnvelope { source }.into())
}

fn recognize_records(value: &Value) -> Option<&Vec<Value>> {
	match value {
		Value::Array(records) => Some(records),
		Value::Object(fields) => fields.get("expenses").and_then(Value::as_array),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn record(id: usize) -> Value {
		serde_json::json!({ "id": id, "cost": "12.50", "description": "groceries" })
	}

	fn payload_with_records(count: usize) -> String {
		let records: Vec<Value> = (0..count).map(record).collect();

		serde_json::to_string(&serde_json::json!({ "expenses": records }))
			.expect("Record payload fixture should serialize.")
	}

	#[test]
	fn five_hundred_records_cap_at_twenty() {
		let assembler = ContextAssembler::default();
		let payload = payload_with_records(500);
		let context = assembler
			.assemble(Some(&payload))
			.expect("Assembly should succeed.")
			.expect("Present input should produce context.");

		assert!(context.truncated());
		assert!(
			context.as_str().len() < payload.len(),
			"Truncated output must be strictly smaller than the input.",
		);

		let envelope: Value = serde_json::from_str(context.as_str())
			.expect("Envelope should be valid JSON.");

		assert_eq!(envelope["expenses"].as_array().map(Vec::len), Some(20));
		assert_eq!(envelope["truncated"], Value::Bool(true));
		assert_eq!(envelope["omitted"], serde_json::json!(480));
	}

	#[test]
	fn cap_keeps_the_most_recent_entries() {
		let assembler = ContextAssembler::new(ContextLimits { max_records: 2, max_raw_chars: 100 });
		let context = assembler
			.assemble_records(&[record(0), record(1), record(2)])
			.expect("Assembly should succeed.");
		let envelope: Value = serde_json::from_str(context.as_str())
			.expect("Envelope should be valid JSON.");

		// Records arrive newest-first; the head of the list survives the cap.
		assert_eq!(envelope["expenses"][0]["id"], serde_json::json!(0));
		assert_eq!(envelope["expenses"][1]["id"], serde_json::json!(1));
	}

	#[test]
	fn small_record_lists_pass_through_unmarked() {
		let assembler = ContextAssembler::default();
		let payload = payload_with_records(3);
		let context = assembler
			.assemble(Some(&payload))
			.expect("Assembly should succeed.")
			.expect("Present input should produce context.");

		assert!(!context.truncated());

		let envelope: Value = serde_json::from_str(context.as_str())
			.expect("Envelope should be valid JSON.");

		assert_eq!(envelope["expenses"].as_array().map(Vec::len), Some(3));
		assert_eq!(envelope["truncated"], Value::Bool(false));
		assert!(envelope.get("omitted").is_none());
	}

	#[test]
	fn top_level_arrays_are_recognized_as_records() {
		let assembler = ContextAssembler::new(ContextLimits { max_records: 1, max_raw_chars: 100 });
		let payload = "[{\"id\":1},{\"id\":2}]";
		let context = assembler
			.assemble(Some(payload))
			.expect("Assembly should succeed.")
			.expect("Present input should produce context.");
		let envelope: Value = serde_json::from_str(context.as_str())
			.expect("Envelope should be valid JSON.");

		assert_eq!(envelope["expenses"].as_array().map(Vec::len), Some(1));
		assert_eq!(envelope["omitted"], serde_json::json!(1));
	}

	#[test]
	fn absent_input_produces_no_context() {
		let assembler = ContextAssembler::default();

		assert_eq!(assembler.assemble(None).expect("Absent input is not an error."), None);
	}

	#[test]
	fn unparseable_payloads_fall_back_to_the_raw_cap() {
		let assembler = ContextAssembler::new(ContextLimits { max_records: 20, max_raw_chars: 10 });
		let context = assembler
			.assemble(Some("definitely not json, and far too long for the cap"))
			.expect("Assembly should succeed.")
			.expect("Present input should produce context.");

		assert!(context.truncated());

		let envelope: Value = serde_json::from_str(context.as_str())
			.expect("Envelope should be valid JSON.");

		assert_eq!(envelope["raw"], Value::String(format!("definitely{RAW_TRUNCATION_MARKER}")));
		assert_eq!(envelope["truncated"], Value::Bool(true));
	}

	#[test]
	fn raw_cap_respects_character_boundaries() {
		let assembler = ContextAssembler::new(ContextLimits { max_records: 20, max_raw_chars: 3 });
		let context = assembler
			.assemble(Some("héllo"))
			.expect("Assembly should succeed.")
			.expect("Present input should produce context.");
		let envelope: Value = serde_json::from_str(context.as_str())
			.expect("Envelope should be valid JSON.");

		assert_eq!(envelope["raw"], Value::String(format!("hél{RAW_TRUNCATION_MARKER}")));
	}

	#[test]
	fn short_raw_payloads_pass_through_unmarked() {
		let assembler = ContextAssembler::default();
		let context = assembler
			.assemble(Some("plain note"))
			.expect("Assembly should succeed.")
			.expect("Present input should produce context.");

		assert!(!context.truncated());

		let envelope: Value = serde_json::from_str(context.as_str())
			.expect("Envelope should be valid JSON.");

		assert_eq!(envelope["raw"], Value::String("plain note".into()));
	}
}
