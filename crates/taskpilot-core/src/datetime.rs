use chrono::{
  DateTime,
  LocalResult,
  NaiveDate,
  NaiveDateTime,
  SecondsFormat,
  TimeZone,
  Utc
};
use chrono_tz::Tz;

pub const TIMEZONE_ENV_VAR: &str =
  "TASKPILOT_TIMEZONE";
const SYSTEM_TIMEZONE_ENV_VAR: &str =
  "TZ";

const NAIVE_FORMATS: [&str; 3] = [
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%dT%H:%M",
  "%Y-%m-%d %H:%M:%S"
];

/// Picks the display timezone: the
/// dedicated env var, then the config
/// value, then `TZ`, then the host zone,
/// then UTC.
pub fn resolve_timezone(
  configured: Option<&str>
) -> Tz {
  let env_value =
    std::env::var(TIMEZONE_ENV_VAR).ok();
  let system_value =
    std::env::var(SYSTEM_TIMEZONE_ENV_VAR)
      .ok();
  let host_value = host_timezone();

  first_timezone([
    (env_value.as_deref(), TIMEZONE_ENV_VAR),
    (configured, "config:timezone"),
    (
      system_value
        .as_deref()
        .map(|raw| {
          raw.trim_start_matches(':')
        }),
      SYSTEM_TIMEZONE_ENV_VAR
    ),
    (host_value.as_deref(), "host")
  ])
}

/// First candidate that names a known
/// zone, else UTC.
pub fn first_timezone<'a, I>(
  candidates: I
) -> Tz
where
  I: IntoIterator<
    Item = (Option<&'a str>, &'a str)
  >
{
  for (raw, source) in candidates {
    if let Some(raw) = raw
      && let Some(tz) =
        parse_timezone(raw, source)
    {
      return tz;
    }
  }

  tracing::info!(
    "no timezone configured; using UTC"
  );
  chrono_tz::UTC
}

fn host_timezone() -> Option<String> {
  match iana_time_zone::get_timezone() {
    | Ok(name) => Some(name),
    | Err(err) => {
      tracing::debug!(
        error = %err,
        "host timezone unavailable"
      );
      None
    }
  }
}

pub fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::debug!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::info!(
        source,
        timezone = %trimmed,
        "resolved display timezone"
      );
      Some(tz)
    }
    | Err(err) => {
      tracing::warn!(
        source,
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}

/// ISO-8601 with the local offset, e.g.
/// `2025-11-08T14:30:00-05:00`.
#[must_use]
pub fn created_iso(
  now: DateTime<Utc>,
  tz: &Tz
) -> String {
  now
    .with_timezone(tz)
    .to_rfc3339_opts(
      SecondsFormat::Secs,
      false
    )
}

#[must_use]
pub fn today_in(
  now: DateTime<Utc>,
  tz: &Tz
) -> NaiveDate {
  now.with_timezone(tz).date_naive()
}

/// Parses a service timestamp. Values
/// without an offset are read as wall
/// time in `tz`.
pub fn parse_timestamp(
  raw: &str,
  tz: &Tz
) -> Option<DateTime<Tz>> {
  let token = raw.trim();

  if let Ok(dt) =
    DateTime::parse_from_rfc3339(token)
  {
    return Some(dt.with_timezone(tz));
  }

  for fmt in NAIVE_FORMATS {
    if let Ok(naive) =
      NaiveDateTime::parse_from_str(
        token, fmt
      )
    {
      return local_to_zoned(naive, tz);
    }
  }

  None
}

fn local_to_zoned(
  naive: NaiveDateTime,
  tz: &Tz
) -> Option<DateTime<Tz>> {
  match tz.from_local_datetime(&naive) {
    | LocalResult::Single(dt) => Some(dt),
    | LocalResult::Ambiguous(
      first,
      second
    ) => {
      tracing::debug!(
        first = %first,
        second = %second,
        "ambiguous local timestamp; using earliest"
      );
      Some(first.min(second))
    }
    | LocalResult::None => {
      tracing::debug!(
        naive = %naive,
        "local timestamp falls in a gap"
      );
      None
    }
  }
}

/// `Today`, `Tomorrow`, or `Mon, Jan 5`.
/// Empty when `raw` does not parse.
#[must_use]
pub fn date_label(
  raw: &str,
  today: NaiveDate,
  tz: &Tz
) -> String {
  let Some(dt) = parse_timestamp(raw, tz)
  else {
    return String::new();
  };

  let date = dt.date_naive();
  if date == today {
    "Today".to_string()
  } else if today
    .succ_opt()
    .is_some_and(|tomorrow| {
      tomorrow == date
    })
  {
    "Tomorrow".to_string()
  } else {
    date.format("%a, %b %-d").to_string()
  }
}

/// `9:00 AM`. Falls back to the raw text
/// when it does not parse.
#[must_use]
pub fn time_label(
  raw: &str,
  tz: &Tz
) -> String {
  match parse_timestamp(raw, tz) {
    | Some(dt) => {
      dt.format("%-I:%M %p").to_string()
    }
    | None => raw.to_string()
  }
}
