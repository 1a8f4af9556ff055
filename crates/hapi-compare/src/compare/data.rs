//! Comparison of a `/data` sample from both servers
//!
//! Payloads are treated as opaque line-oriented text. Line endings and
//! trailing whitespace are normalized before comparing; remaining
//! differences are reported line by line.

use super::field::INDENT;
use crate::catalog::NormalizedCatalog;
use crate::client::{DataQuery, DataResponse, DataSource};
use crate::config::{ComparisonContext, ServerSpec, Side};
use crate::error::CompareResult;
use crate::report::Reporter;
use hapi_core::{fields, format_sample_time, parse_hapi_time, Info, TimeParseError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::info;

/// Differing lines shown before the rest are summarized
const MAX_LINE_DIFFS: usize = 10;

const AFTER_NORMALIZATION: &str =
    "after replacement of '\\r\\n' with '\\n' and trimming trailing whitespace.";

/// Why no sample window could be chosen
#[derive(Debug, Error)]
pub enum WindowError {
    #[error("{label} info has no startDate")]
    MissingStartDate { label: String },

    #[error(transparent)]
    Time(#[from] TimeParseError),
}

/// The `time.min`/`time.max` pair of a data request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleWindow {
    pub start: String,
    pub stop: String,
}

/// Choose the time window to request from both servers
///
/// Declared sample dates are read candidate first and then overwritten by
/// the baseline's. The baseline's `sampleStopDate` replaces the candidate's
/// whenever the baseline declares `sampleStartDate`, even if it has no stop.
/// When either end is still missing the window starts at the later of the
/// two `startDate`s and lasts the configured sample duration.
pub fn sample_window(
    baseline: &Info,
    candidate: &Info,
    ctx: &ComparisonContext,
) -> Result<SampleWindow, WindowError> {
    let baseline_declares = baseline.contains_key(fields::SAMPLE_START_DATE);

    let mut start = candidate.get_str(fields::SAMPLE_START_DATE);
    if baseline_declares {
        start = baseline.get_str(fields::SAMPLE_START_DATE);
    }
    let mut stop = candidate.get_str(fields::SAMPLE_STOP_DATE);
    if baseline_declares {
        stop = baseline.get_str(fields::SAMPLE_STOP_DATE);
    }

    if let (Some(start), Some(stop)) = (start, stop) {
        return Ok(SampleWindow {
            start: start.to_string(),
            stop: stop.to_string(),
        });
    }

    let start_date = |info: &Info, side: Side| -> Result<_, WindowError> {
        let value = info
            .get_str(fields::START_DATE)
            .ok_or_else(|| WindowError::MissingStartDate {
                label: ctx.label(side).to_string(),
            })?;
        Ok(parse_hapi_time(value)?)
    };
    let start = start_date(baseline, Side::Baseline)?
        .max(start_date(candidate, Side::Candidate)?);
    let stop = start + ctx.sample_duration();

    Ok(SampleWindow {
        start: format_sample_time(&start),
        stop: format_sample_time(&stop),
    })
}

struct TimedResponse {
    response: DataResponse,
    elapsed: Duration,
}

async fn timed_fetch(
    source: &dyn DataSource,
    server: &ServerSpec,
    query: &DataQuery,
) -> CompareResult<TimedResponse> {
    info!("{INDENT}Getting: {}", query.url(server));
    let start = Instant::now();
    let response = source.fetch_data(server, query).await?;
    Ok(TimedResponse {
        response,
        elapsed: start.elapsed(),
    })
}

/// Fetch the same sample from both servers and compare the payloads
///
/// `parameters` restricts the request to the parameters both servers share;
/// `None` requests all of them. Does nothing unless data comparison is
/// enabled and both catalogs contain `id`.
pub async fn compare_data(
    id: &str,
    baseline: &NormalizedCatalog,
    candidate: &NormalizedCatalog,
    ctx: &ComparisonContext,
    source: &dyn DataSource,
    reporter: &mut Reporter,
    parameters: Option<&[String]>,
) {
    if !ctx.compare_data() {
        return;
    }
    let (Some(dataset_s1), Some(dataset_s2)) = (baseline.get(id), candidate.get(id)) else {
        return;
    };

    let window = match sample_window(&dataset_s1.info, &dataset_s2.info, ctx) {
        Ok(window) => window,
        Err(e) => {
            reporter.error(format!("{id} - Cannot choose a data sample: {e}"));
            return;
        }
    };

    let query = DataQuery {
        id: id.to_string(),
        parameters: parameters.map(<[String]>::to_vec).unwrap_or_default(),
        time_min: window.start,
        time_max: window.stop,
    };

    info!("{id} - Checking data");

    let (result_s1, result_s2) = if ctx.parallel() {
        tokio::join!(
            timed_fetch(source, ctx.baseline(), &query),
            timed_fetch(source, ctx.candidate(), &query)
        )
    } else {
        let result_s1 = timed_fetch(source, ctx.baseline(), &query).await;
        let result_s2 = timed_fetch(source, ctx.candidate(), &query).await;
        (result_s1, result_s2)
    };

    let (timed_s1, timed_s2) = match (result_s1, result_s2) {
        (Ok(timed_s1), Ok(timed_s2)) => (timed_s1, timed_s2),
        (result_s1, result_s2) => {
            for (side, result) in [(Side::Baseline, result_s1), (Side::Candidate, result_s2)] {
                if let Err(e) = result {
                    reporter.error(format!(
                        "{INDENT}{} data request failed: {e}",
                        ctx.label(side)
                    ));
                }
            }
            return;
        }
    };

    for (side, timed) in [(Side::Baseline, &timed_s1), (Side::Candidate, &timed_s2)] {
        let status = timed.response.status;
        let text = format!(
            "{INDENT}{} time = {:.6} [s]; status = {status}",
            ctx.padded(side),
            timed.elapsed.as_secs_f64()
        );
        if status == 200 {
            reporter.info(text);
        } else {
            reporter.error(text);
        }
    }

    let (status_s1, status_s2) = (timed_s1.response.status, timed_s2.response.status);
    if status_s1 != status_s2 {
        reporter.error(format!(
            "{INDENT}{} HTTP status = {status_s2} != {} HTTP status = {status_s1}",
            ctx.label(Side::Candidate),
            ctx.label(Side::Baseline)
        ));
        return;
    }

    compare_payloads(
        &timed_s1.response.body,
        &timed_s2.response.body,
        ctx,
        reporter,
    );
}

/// Replace CRLF with LF and trim trailing whitespace
pub fn normalize_payload(body: &str) -> String {
    body.replace("\r\n", "\n").trim_end().to_string()
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\u{0b}'
            | '\u{0c}'
            | '\u{1c}'
            | '\u{1d}'
            | '\u{1e}'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

/// Split on every Unicode line boundary; a trailing break adds no empty line
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        match rest.char_indices().find(|(_, c)| is_line_break(*c)) {
            Some((i, c)) => {
                lines.push(&rest[..i]);
                let mut next = i + c.len_utf8();
                if c == '\r' && rest[next..].starts_with('\n') {
                    next += 1;
                }
                rest = &rest[next..];
            }
            None => {
                lines.push(rest);
                break;
            }
        }
    }

    lines
}

/// Compare two payloads as text, then line by line
///
/// Lengths are counted in characters.
pub fn compare_payloads(
    body_s1: &str,
    body_s2: &str,
    ctx: &ComparisonContext,
    reporter: &mut Reporter,
) {
    let s1 = ctx.label(Side::Baseline);
    let s2 = ctx.label(Side::Candidate);
    let len = |s: &str| s.chars().count();

    let normalized_s1 = normalize_payload(body_s1);
    let normalized_s2 = normalize_payload(body_s2);

    for (label, raw, normalized) in [
        (s1, body_s1, &normalized_s1),
        (s2, body_s2, &normalized_s2),
    ] {
        let delta = len(raw) - len(normalized);
        if delta != 0 {
            reporter.warning(format!(
                "{INDENT}{label} data length changed by {delta} {AFTER_NORMALIZATION}"
            ));
        }
    }

    if len(body_s1) != len(body_s2) && len(&normalized_s1) != len(&normalized_s2) {
        reporter.error(format!(
            "{INDENT}{s2} data (length = {}) != {s1} data (length = {})\n{INDENT}and\n\
             {INDENT}{s2} data (length = {}) != {s1} data (length = {}) {AFTER_NORMALIZATION}",
            len(body_s2),
            len(body_s1),
            len(&normalized_s2),
            len(&normalized_s1)
        ));
    }

    if normalized_s1 == normalized_s2 {
        return;
    }

    let lines_s1 = split_lines(&normalized_s1);
    let lines_s2 = split_lines(&normalized_s2);
    if lines_s1 == lines_s2 {
        reporter.info(format!("{INDENT}{s2} data == {s1} data after splitting lines"));
    }

    let counts = format!(
        "{INDENT}{s2} data has {} lines; {s1} data has {} lines {AFTER_NORMALIZATION}",
        lines_s2.len(),
        lines_s1.len()
    );
    if lines_s1.len() == lines_s2.len() {
        reporter.info(counts);
    } else {
        reporter.error(counts);
    }

    let mut shown = 0;
    for (i, (line_s1, line_s2)) in lines_s1.iter().zip(&lines_s2).enumerate() {
        if line_s1 == line_s2 {
            continue;
        }
        if shown == MAX_LINE_DIFFS {
            reporter.error(format!(
                "{INDENT}More than {MAX_LINE_DIFFS} lines differ; not displaying more."
            ));
            break;
        }
        reporter.error(format!(
            "{INDENT}Line {i}:\n{INDENT}{INDENT}{}: {line_s1}\n{INDENT}{INDENT}{}: {line_s2}",
            ctx.padded(Side::Baseline),
            ctx.padded(Side::Candidate)
        ));
        shown += 1;
    }
}
