use serde::{Deserialize, Serialize};

use crate::instance::Instance;

/// Aggregate verdict over all registered instances. Derived from a
/// registry snapshot on every read; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStatus {
    pub instances: Vec<Instance>,
    pub active_count: usize,
    pub needs_attention_count: usize,
    pub total_count: usize,
    /// Every registered instance is waiting. False when nothing is
    /// registered: zero instances means nothing to supervise, not an
    /// emergency.
    pub all_need_attention: bool,
    pub some_need_attention: bool,
}

impl AggregateStatus {
    /// Pure reduction of an (already swept) registry snapshot.
    pub fn from_instances(instances: Vec<Instance>) -> Self {
        let total_count = instances.len();
        let active_count = instances.iter().filter(|i| i.is_active).count();
        let needs_attention_count = total_count - active_count;
        Self {
            instances,
            active_count,
            needs_attention_count,
            total_count,
            all_need_attention: total_count > 0 && active_count == 0,
            some_need_attention: needs_attention_count > 0,
        }
    }

    pub fn empty() -> Self {
        Self::from_instances(Vec::new())
    }

    /// Instances currently waiting for input.
    pub fn waiting(&self) -> impl Iterator<Item = &Instance> {
        self.instances.iter().filter(|i| i.needs_attention())
    }
}

/// What a tab should be showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisplayMode {
    /// All sessions working (or nothing to supervise): show nothing.
    #[default]
    Hidden,
    /// Some sessions waiting: corner notification.
    Notification,
    /// Every session waiting: full-screen block.
    FullOverlay,
}

impl DisplayMode {
    /// Client-side policy mapping a fetched status (or the lack of one)
    /// to a display mode. `None` means the reporting channel is down;
    /// the safe default is the blocking overlay, forcing the user to
    /// check rather than silently missing an attention request.
    pub fn from_status(status: Option<&AggregateStatus>) -> Self {
        let Some(data) = status else {
            return Self::FullOverlay;
        };
        if data.total_count == 0 {
            return Self::Hidden;
        }
        if data.all_need_attention {
            return Self::FullOverlay;
        }
        if data.some_need_attention {
            return Self::Notification;
        }
        Self::Hidden
    }
}

/// Corner-widget subtitle summarizing who is waiting: the instance name
/// when exactly one waits, a count when several do, generic text when
/// no data is available.
pub fn waiting_summary(status: Option<&AggregateStatus>) -> String {
    let Some(data) = status else {
        return "Waiting for input".to_string();
    };
    let waiting: Vec<&Instance> = data.waiting().collect();
    match waiting.as_slice() {
        [] => "Waiting for input".to_string(),
        [only] => format!("{} is waiting", only.name),
        many => format!("{} instances waiting", many.len()),
    }
}
