use crate::db::models::{HistoryChange, HistoryCost};
use crate::export::records::DeviceSnapshot;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Recorded changes and costs of one device, bucketed by day.
#[derive(Debug, Default, Clone)]
pub struct DeviceEvents {
    changes: BTreeMap<NaiveDate, Vec<HistoryChange>>,
    costs: BTreeMap<NaiveDate, Vec<HistoryCost>>,
}

impl DeviceEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_change(&mut self, change: HistoryChange) {
        self.changes.entry(change.date).or_default().push(change);
    }

    pub fn push_cost(&mut self, cost: HistoryCost) {
        self.costs.entry(cost.end).or_default().push(cost);
    }
}

/// Walks a device's state backwards one day at a time.
///
/// Starting from the current state dated `start`, each step moves to the
/// previous day, applies the changes and costs recorded for it, and yields
/// the result. The walk stops after `end` or before the device's creation
/// date, whichever comes first.
#[derive(Debug, Clone)]
pub struct DeviceHistory {
    snapshot: DeviceSnapshot,
    end: NaiveDate,
    created: NaiveDate,
    events: DeviceEvents,
}

impl DeviceHistory {
    pub fn new(
        current: DeviceSnapshot,
        end: NaiveDate,
        created: NaiveDate,
        events: DeviceEvents,
    ) -> Self {
        Self {
            snapshot: current,
            end,
            created,
            events,
        }
    }

    fn apply_day(&mut self, date: NaiveDate) {
        self.snapshot.date = date;

        if let Some(changes) = self.events.changes.get(&date) {
            for change in changes.iter().filter(|c| c.is_parent_change()) {
                apply_parent_change(&mut self.snapshot, change);
            }

            if self.snapshot.is_virtual {
                let memory: i64 = changes
                    .iter()
                    .filter(|c| c.is_virtual_ram_size_change())
                    .filter_map(|c| match c.old_value.trim().parse::<i64>() {
                        Ok(size) => Some(size),
                        Err(_) => {
                            warn!(
                                device_id = self.snapshot.device_id,
                                field = %c.field_name,
                                value = %c.old_value,
                                "Ignoring non-numeric memory size change"
                            );
                            None
                        }
                    })
                    .sum();
                if memory != 0 {
                    self.snapshot.virtual_memory = memory;
                }
            }
        }

        if let Some(costs) = self.events.costs.get(&date) {
            for cost in costs {
                self.snapshot.venture_id = cost.venture_id;
                self.snapshot.virtual_cores = cost.cores;
                self.snapshot.physical_cores = cost.cores;
            }
        }
    }
}

impl Iterator for DeviceHistory {
    type Item = DeviceSnapshot;

    fn next(&mut self) -> Option<Self::Item> {
        if self.snapshot.date <= self.end {
            return None;
        }

        let date = self.snapshot.date.pred_opt()?;
        if date < self.created {
            debug!(
                device_id = self.snapshot.device_id,
                created = %self.created,
                "Reached device creation date"
            );
            return None;
        }

        self.apply_day(date);
        Some(self.snapshot.clone())
    }
}

fn apply_parent_change(snapshot: &mut DeviceSnapshot, change: &HistoryChange) {
    if change.old_value == "None" {
        snapshot.parent_id = None;
    } else if let Some(parent_id) = parse_device_repr(&change.new_value) {
        snapshot.parent_id = Some(parent_id);
    }
}

/// Extracts the id from a device repr such as `"rack-01 (1234)"`.
pub fn parse_device_repr(value: &str) -> Option<i64> {
    let inner = value.strip_suffix(')')?;
    let open = inner.rfind('(')?;
    let digits = &inner[open + 1..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
