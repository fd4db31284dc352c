//! Campaign loading pipeline: find the data files in a directory, parse
//! them, validate, and resolve into core timeline types.

use crate::loader::{
    DataLoadError, check_duplicate, deserialize_file, find_data_file, require_data_file,
};
use crate::schema::{CampaignData, EventData, EventKindData, LayoutData};
use orbitline_core::FlowConfig;
use orbitline_core::layout::LayoutParameters;
use orbitline_core::matcher::{MatchMode, SEQUENCE_SLOTS};
use orbitline_core::{Day, Demand, EventConfig, EventKind, Loop};
use std::collections::HashSet;
use std::path::Path;

/// Base name of the required campaign file.
pub const CAMPAIGN_FILE: &str = "campaign";
/// Base name of the optional controller tuning file.
pub const FLOW_FILE: &str = "flow";

/// A resolved campaign: loops ready to hand to the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct Campaign {
    pub title: String,
    pub loops: Vec<Loop>,
}

impl Campaign {
    pub fn loop_named(&self, name: &str) -> Option<&Loop> {
        self.loops.iter().find(|l| l.name == name)
    }

    pub fn first_loop(&self) -> Option<&Loop> {
        self.loops.first()
    }
}

// ===========================================================================
// Loading
// ===========================================================================

/// Load `campaign.{ron,toml,json}` from `dir`.
pub fn load_campaign(dir: &Path) -> Result<Campaign, DataLoadError> {
    let path = require_data_file(dir, CAMPAIGN_FILE)?;
    load_campaign_file(&path)
}

/// Load a campaign from an explicit file path.
pub fn load_campaign_file(path: &Path) -> Result<Campaign, DataLoadError> {
    let data: CampaignData = deserialize_file(path)?;
    let campaign = resolve_campaign(data, path)?;
    log::info!(
        "loaded campaign '{}' with {} loop(s) from {}",
        campaign.title,
        campaign.loops.len(),
        path.display()
    );
    Ok(campaign)
}

/// Load `flow.{ron,toml,json}` from `dir`, or the defaults when absent.
pub fn load_flow_config(dir: &Path) -> Result<FlowConfig, DataLoadError> {
    match find_data_file(dir, FLOW_FILE)? {
        Some(path) => {
            let config: FlowConfig = deserialize_file(&path)?;
            validate_flow_config(&config, &path)?;
            Ok(config)
        }
        None => {
            log::debug!("no flow config in {}, using defaults", dir.display());
            Ok(FlowConfig::default())
        }
    }
}

fn validate_flow_config(config: &FlowConfig, file: &Path) -> Result<(), DataLoadError> {
    let invalid = |detail: &str| DataLoadError::InvalidConfig {
        file: file.to_path_buf(),
        detail: detail.to_string(),
    };
    if config.delivery_delay < 0.0 || config.time_up_dialog_delay < 0.0 {
        return Err(invalid("delays must not be negative"));
    }
    if config.event_history_capacity == 0 {
        return Err(invalid("event_history_capacity must be positive"));
    }
    let tuning = &config.layout;
    if tuning.scale_min > tuning.scale_max {
        return Err(invalid("layout.scale_min exceeds layout.scale_max"));
    }
    Ok(())
}

// ===========================================================================
// Resolution
// ===========================================================================

/// Validate `data` and convert it into core types. `file` is used in errors.
pub fn resolve_campaign(data: CampaignData, file: &Path) -> Result<Campaign, DataLoadError> {
    let mut loop_names = HashSet::new();
    let mut loops = Vec::with_capacity(data.loops.len());

    for loop_data in data.loops {
        check_duplicate(&mut loop_names, &loop_data.name, "loop", file)?;

        let mut day_names = HashSet::new();
        let mut event_names = HashSet::new();
        let mut days = Vec::with_capacity(loop_data.days.len());
        for day_data in loop_data.days {
            check_duplicate(&mut day_names, &day_data.name, "day", file)?;
            if day_data.events.is_empty() {
                log::warn!(
                    "day '{}' in loop '{}' has no events",
                    day_data.name,
                    loop_data.name
                );
            }
            let events = day_data
                .events
                .into_iter()
                .map(|event| {
                    check_duplicate(&mut event_names, &event.name, "event", file)?;
                    resolve_event(event, file)
                })
                .collect::<Result<Vec<_>, _>>()?;
            days.push(Day::new(day_data.name, events));
        }
        loops.push(Loop::new(loop_data.name, days));
    }

    Ok(Campaign {
        title: data.title,
        loops,
    })
}

fn resolve_event(data: EventData, file: &Path) -> Result<EventConfig, DataLoadError> {
    let invalid = |detail: String| DataLoadError::InvalidEvent {
        file: file.to_path_buf(),
        event: data.name.clone(),
        detail,
    };

    if let Some(limit) = data.time_limit.filter(|&l| l <= 0.0) {
        return Err(invalid(format!("time_limit must be positive, got {limit}")));
    }

    let kind = match data.kind {
        EventKindData::Narrative => EventKind::Narrative,
        EventKindData::Dialog => EventKind::Dialog,
        EventKindData::Gameplay => EventKind::Gameplay,
    };

    let layout = match (&data.layout, kind) {
        (Some(layout), _) => Some(resolve_layout(layout).map_err(|d| invalid(d.to_string()))?),
        (None, EventKind::Gameplay) if !data.demands.is_empty() => {
            return Err(invalid("gameplay event has no layout".to_string()));
        }
        (None, _) => None,
    };

    if kind != EventKind::Gameplay && !data.demands.is_empty() {
        log::warn!(
            "{:?} event '{}' lists demands; they are ignored",
            kind,
            data.name
        );
    }

    let match_mode = if data.sequence {
        if data.demands.len() > SEQUENCE_SLOTS {
            return Err(invalid(format!(
                "sequence has {} demands, at most {SEQUENCE_SLOTS} slots",
                data.demands.len()
            )));
        }
        MatchMode::Positional
    } else {
        MatchMode::Multiset
    };

    let demands = data
        .demands
        .iter()
        .map(|d| Demand::new(d.shape.into(), d.color.into()))
        .collect();

    Ok(EventConfig {
        kind,
        description: data.description,
        cutscene: data.cutscene,
        demands,
        match_mode,
        layout,
        time_limit: data.time_limit,
        time_up_dialog: data.time_up_dialog,
        completed: false,
        name: data.name,
    })
}

fn resolve_layout(data: &LayoutData) -> Result<LayoutParameters, &'static str> {
    if data.object_count == 0 {
        return Err("layout.object_count must be positive");
    }
    if data.min_radius <= 0.0 {
        return Err("layout.min_radius must be positive");
    }
    if data.radius_per_object < 0.0 {
        return Err("layout.radius_per_object must not be negative");
    }
    if data.machine_distance <= 0.0 {
        return Err("layout.machine_distance must be positive");
    }

    let mut layout = LayoutParameters::new(data.object_count, data.min_radius, data.radius_per_object)
        .with_machines(data.machines.iter().map(|&m| m.into()).collect())
        .with_angular_speed(data.angular_speed);
    layout.machine_distance_multiplier = data.machine_distance;
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColorData, DayData, DemandData, LoopData, ShapeData};
    use orbitline_core::{ColorKind, ShapeKind};

    fn file() -> &'static Path {
        Path::new("campaign.ron")
    }

    fn layout() -> LayoutData {
        LayoutData {
            object_count: 3,
            min_radius: 2.0,
            radius_per_object: 0.5,
            angular_speed: 0.0,
            machines: Vec::new(),
            machine_distance: 1.5,
        }
    }

    fn event(name: &str, kind: EventKindData) -> EventData {
        EventData {
            name: name.to_string(),
            kind,
            description: String::new(),
            cutscene: None,
            demands: Vec::new(),
            sequence: false,
            layout: None,
            time_limit: None,
            time_up_dialog: None,
        }
    }

    fn red_circle() -> DemandData {
        DemandData {
            shape: ShapeData::Circle,
            color: ColorData::Red,
        }
    }

    fn campaign(days: Vec<DayData>) -> CampaignData {
        CampaignData {
            title: "Test".to_string(),
            loops: vec![LoopData {
                name: "one".to_string(),
                days,
            }],
        }
    }

    fn day(name: &str, events: Vec<EventData>) -> DayData {
        DayData {
            name: name.to_string(),
            events,
        }
    }

    #[test]
    fn resolves_gameplay_event() {
        let mut gameplay = event("orders", EventKindData::Gameplay);
        gameplay.demands = vec![red_circle()];
        gameplay.layout = Some(layout());
        gameplay.time_limit = Some(30.0);

        let campaign = resolve_campaign(campaign(vec![day("monday", vec![gameplay])]), file()).unwrap();
        let event = &campaign.loops[0].days[0].events[0];
        assert_eq!(event.kind, EventKind::Gameplay);
        assert_eq!(event.demands, vec![Demand::new(ShapeKind::Circle, ColorKind::Red)]);
        assert_eq!(event.match_mode, MatchMode::Multiset);
        assert_eq!(event.time_limit, Some(30.0));
        assert_eq!(event.layout.as_ref().unwrap().object_count, 3);
    }

    #[test]
    fn sequence_becomes_positional() {
        let mut gameplay = event("sequence", EventKindData::Gameplay);
        gameplay.demands = vec![red_circle(), red_circle()];
        gameplay.layout = Some(layout());
        gameplay.sequence = true;

        let campaign = resolve_campaign(campaign(vec![day("d", vec![gameplay])]), file()).unwrap();
        assert_eq!(
            campaign.loops[0].days[0].events[0].match_mode,
            MatchMode::Positional
        );
    }

    #[test]
    fn sequence_longer_than_slots_is_rejected() {
        let mut gameplay = event("long", EventKindData::Gameplay);
        gameplay.demands = vec![red_circle(); SEQUENCE_SLOTS + 1];
        gameplay.layout = Some(layout());
        gameplay.sequence = true;

        let err = resolve_campaign(campaign(vec![day("d", vec![gameplay])]), file()).unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidEvent { ref event, .. } if event == "long"));
    }

    #[test]
    fn gameplay_without_layout_is_rejected() {
        let mut gameplay = event("orders", EventKindData::Gameplay);
        gameplay.demands = vec![red_circle()];

        let err = resolve_campaign(campaign(vec![day("d", vec![gameplay])]), file()).unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidEvent { .. }));
    }

    #[test]
    fn bad_radius_is_rejected() {
        let mut gameplay = event("orders", EventKindData::Gameplay);
        gameplay.demands = vec![red_circle()];
        gameplay.layout = Some(LayoutData {
            min_radius: 0.0,
            ..layout()
        });

        let err = resolve_campaign(campaign(vec![day("d", vec![gameplay])]), file()).unwrap_err();
        assert!(err.to_string().contains("min_radius"));
    }

    #[test]
    fn negative_time_limit_is_rejected() {
        let mut narrative = event("slow", EventKindData::Narrative);
        narrative.time_limit = Some(-1.0);
        assert!(resolve_campaign(campaign(vec![day("d", vec![narrative])]), file()).is_err());
    }

    #[test]
    fn duplicate_event_names_across_days_are_rejected() {
        let err = resolve_campaign(
            campaign(vec![
                day("monday", vec![event("intro", EventKindData::Narrative)]),
                day("tuesday", vec![event("intro", EventKindData::Narrative)]),
            ]),
            file(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::DuplicateName { scope: "event", .. }
        ));
    }

    #[test]
    fn duplicate_day_names_are_rejected() {
        let err = resolve_campaign(
            campaign(vec![day("monday", vec![]), day("monday", vec![])]),
            file(),
        )
        .unwrap_err();
        assert!(matches!(err, DataLoadError::DuplicateName { scope: "day", .. }));
    }

    #[test]
    fn empty_day_is_kept() {
        let campaign = resolve_campaign(campaign(vec![day("rest", vec![])]), file()).unwrap();
        assert!(campaign.loops[0].days[0].events.is_empty());
    }

    #[test]
    fn flow_config_values_are_validated() {
        let path = Path::new("flow.ron");
        assert!(validate_flow_config(&FlowConfig::default(), path).is_ok());

        let negative = FlowConfig::default().with_delivery_delay(-1.0);
        let err = validate_flow_config(&negative, path).unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidConfig { .. }));
        assert_eq!(
            err.to_string(),
            "invalid flow config in flow.ron: delays must not be negative"
        );

        let mut inverted = FlowConfig::default();
        inverted.layout.scale_min = 2.0;
        assert!(matches!(
            validate_flow_config(&inverted, path),
            Err(DataLoadError::InvalidConfig { .. })
        ));

        let empty_history = FlowConfig {
            event_history_capacity: 0,
            ..FlowConfig::default()
        };
        assert!(matches!(
            validate_flow_config(&empty_history, path),
            Err(DataLoadError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn lookup_by_loop_name() {
        let campaign = resolve_campaign(campaign(vec![]), file()).unwrap();
        assert!(campaign.loop_named("one").is_some());
        assert!(campaign.loop_named("two").is_none());
        assert_eq!(campaign.first_loop().unwrap().name, "one");
    }
}
