use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::{ResultSegment, Status};

/// Point-in-time view of one paragraph's execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphResult {
    pub paragraph_id: String,
    pub status: Status,
    /// Percent complete, 0..=100. Only meaningful while pending or running.
    pub progress: u8,
    pub results: Vec<ResultSegment>,
    /// External job UI links, e.g. the Spark job page.
    pub job_urls: Vec<String>,
}

impl ParagraphResult {
    /// Decode a paragraph document. Only `id`, `status` and `progress` are
    /// read directly; every optional substructure degrades to empty.
    pub fn from_json(paragraph: &Value) -> Self {
        Self {
            paragraph_id: paragraph
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            status: Status::from(paragraph.get("status").and_then(Value::as_str)),
            progress: read_progress(paragraph.get("progress")),
            results: read_segments(paragraph.get("results")),
            job_urls: read_job_urls(paragraph.get("runtimeInfos")),
        }
    }

    /// All segment payloads, each followed by a newline.
    pub fn message(&self) -> String {
        self.results
            .iter()
            .fold(String::new(), |mut out, segment| {
                out.push_str(segment.data());
                out.push('\n');
                out
            })
    }
}

impl fmt::Display for ParagraphResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ParagraphResult{{paragraphId='{}', status='{}', results={}, progress={}}}",
            self.paragraph_id,
            self.status,
            self.message(),
            self.progress
        )
    }
}

fn read_progress(value: Option<&Value>) -> u8 {
    let raw = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    };
    raw.clamp(0, 100) as u8
}

fn read_segments(results: Option<&Value>) -> Vec<ResultSegment> {
    results
        .and_then(|results| results.get("msg"))
        .and_then(Value::as_array)
        .map(|messages| messages.iter().map(ResultSegment::from_json).collect())
        .unwrap_or_default()
}

/// Job URLs live either directly under `runtimeInfos.values` or, as newer
/// servers report them, under `runtimeInfos.<info name>.values`.
fn read_job_urls(runtime_infos: Option<&Value>) -> Vec<String> {
    let Some(infos) = runtime_infos.and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut urls = Vec::new();
    if let Some(values) = infos.get("values") {
        collect_job_urls(values, &mut urls);
    }
    for (name, info) in infos {
        if name == "values" || !info.is_object() {
            continue;
        }
        if let Some(values) = info.get("values") {
            collect_job_urls(values, &mut urls);
        }
    }
    urls
}

fn collect_job_urls(values: &Value, urls: &mut Vec<String>) {
    let Some(entries) = values.as_array() else {
        return;
    };
    urls.extend(
        entries
            .iter()
            .filter_map(|entry| entry.get("jobUrl").and_then(Value::as_str))
            .map(ToOwned::to_owned),
    );
}
