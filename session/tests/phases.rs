use std::time::Duration;

use nightmare_dorm_core::{BuildingKind, CellIndex, Event, MemoryStore, Phase, RoomId};
use nightmare_dorm_session::{Session, SessionConfig};
use proptest::prelude::*;

#[derive(Clone, Copy, Debug)]
enum Action {
    Tick(u64),
    Select(u32),
    UpgradeBed,
    UpgradeDoor,
    Build(u32, BuildingKind),
}

fn action_strategy() -> impl Strategy<Value = Action> {
    let kinds = prop_oneof![
        Just(BuildingKind::Turret),
        Just(BuildingKind::Generator),
        Just(BuildingKind::Trap),
        Just(BuildingKind::Plant),
    ];
    prop_oneof![
        10 => (50u64..3_000).prop_map(Action::Tick),
        1 => (0u32..8).prop_map(Action::Select),
        1 => Just(Action::UpgradeBed),
        1 => Just(Action::UpgradeDoor),
        1 => (0u32..8, kinds).prop_map(|(cell, kind)| Action::Build(cell, kind)),
    ]
}

fn allowed(from: Phase, to: Phase) -> bool {
    matches!(
        (from, to),
        (Phase::Selecting, Phase::Playing)
            | (Phase::Selecting, Phase::GameOver)
            | (Phase::Playing, Phase::Victory)
            | (Phase::Playing, Phase::GameOver)
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn phases_only_move_forward(
        seed in any::<u64>(),
        actions in proptest::collection::vec(action_strategy(), 1..300),
    ) {
        let config = SessionConfig {
            seed,
            selection_secs: 5.0,
            survival_secs: 90.0,
            ..SessionConfig::default()
        };
        let mut session = Session::new(config, MemoryStore::default());
        let mut finished_at = None;
        let mut tracked = Phase::Selecting;

        for action in actions {
            let events = match action {
                Action::Tick(millis) => session.tick(Duration::from_millis(millis)),
                Action::Select(room) => {
                    let _ = session.select_room(RoomId::new(room));
                    Vec::new()
                }
                Action::UpgradeBed => {
                    let _ = session.upgrade_bed();
                    Vec::new()
                }
                Action::UpgradeDoor => {
                    let _ = session.upgrade_door();
                    Vec::new()
                }
                Action::Build(cell, kind) => {
                    let _ = session.build_at(CellIndex::new(cell), kind);
                    Vec::new()
                }
            };

            for event in &events {
                if let Event::PhaseChanged { from, to } = event {
                    prop_assert_eq!(*from, tracked);
                    prop_assert!(allowed(*from, *to));
                    tracked = *to;
                }
            }
            if matches!(action, Action::Tick(_)) {
                prop_assert_eq!(tracked, session.phase());
            }

            prop_assert!(session.gold() >= 0.0);
            if session.phase().is_terminal() {
                let reward = session.bee_reward();
                prop_assert!(reward.is_some());
                match finished_at {
                    None => finished_at = Some((session.phase(), reward)),
                    Some(previous) => prop_assert_eq!(previous, (session.phase(), reward)),
                }
            }
        }

        prop_assert!(session.store().stats().total_games <= 1);
    }
}
