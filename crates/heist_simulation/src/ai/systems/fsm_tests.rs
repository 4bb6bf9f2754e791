//! Tests for guard FSM transitions (pure tick_guard / receive_alert).

#[cfg(test)]
mod tests {
    use super::super::fsm::{receive_alert, tick_guard};
    use crate::ai::components::{GuardConfig, GuardState, GuardStateKind, PatrolRoute};
    use crate::ai::target::TargetView;
    use crate::alert::{AlertBus, AlertEvent, AlertHandler};
    use crate::components::MovementCommand;
    use crate::sensing::{Obstacles, ObserverPose, OpenSpace};
    use bevy::prelude::{Entity, Vec3};

    const DT: f32 = 0.02;

    fn guard() -> Entity {
        Entity::from_raw(1)
    }

    fn target_at(position: Vec3) -> TargetView {
        TargetView {
            entity: Entity::from_raw(99),
            position,
            noise_radius: 0.0,
            is_incapacitated: false,
            is_captured: false,
        }
    }

    /// Guard в начале координат, смотрит вдоль +X
    fn pose_at_origin() -> ObserverPose {
        ObserverPose::new(Vec3::ZERO, Vec3::X, 1.0)
    }

    fn far_route() -> PatrolRoute {
        PatrolRoute::new(vec![Vec3::new(0.0, 0.0, 30.0), Vec3::new(30.0, 0.0, 30.0)])
    }

    // ========================================
    // Sight
    // ========================================

    #[test]
    fn test_visible_intruder_starts_chase_and_broadcasts() {
        let config = GuardConfig::default();
        let mut state = GuardState::patrol(&config);
        let mut route = far_route();
        let intruder = Vec3::new(10.0, 0.0, 0.0);

        let tick = tick_guard(
            guard(),
            &mut state,
            &mut route,
            &config,
            &pose_at_origin(),
            &target_at(intruder),
            &OpenSpace,
            DT,
        );

        assert_eq!(state, GuardState::Chase { last_seen: intruder });
        assert_eq!(tick.broadcast, Some(AlertEvent::sighting(intruder, guard())));
        assert_eq!(
            tick.command,
            MovementCommand::MoveToPosition {
                target: intruder,
                speed: config.chase_speed
            }
        );
        assert!(!tick.captured);
    }

    #[test]
    fn test_wall_blocks_sight() {
        let config = GuardConfig::default();
        let mut state = GuardState::patrol(&config);
        let mut route = far_route();
        let walls = Obstacles::new().with_wall(Vec3::new(5.0, 1.0, 0.0), Vec3::new(0.5, 2.0, 2.0));

        let tick = tick_guard(
            guard(),
            &mut state,
            &mut route,
            &config,
            &pose_at_origin(),
            &target_at(Vec3::new(10.0, 0.0, 0.0)),
            &walls,
            DT,
        );

        assert_eq!(state.kind(), GuardStateKind::Patrol);
        assert_eq!(tick.broadcast, None);
    }

    #[test]
    fn test_intruder_behind_guard_not_seen() {
        let config = GuardConfig::default();
        let mut state = GuardState::patrol(&config);
        let mut route = far_route();

        tick_guard(
            guard(),
            &mut state,
            &mut route,
            &config,
            &pose_at_origin(),
            &target_at(Vec3::new(-5.0, 0.0, 0.0)),
            &OpenSpace,
            DT,
        );

        assert_eq!(state.kind(), GuardStateKind::Patrol);
    }

    #[test]
    fn test_incapacitated_intruder_not_noticed() {
        let config = GuardConfig::default();
        let mut state = GuardState::patrol(&config);
        let mut route = far_route();
        let mut target = target_at(Vec3::new(5.0, 0.0, 0.0));
        target.is_incapacitated = true;

        let tick = tick_guard(
            guard(),
            &mut state,
            &mut route,
            &config,
            &pose_at_origin(),
            &target,
            &OpenSpace,
            DT,
        );

        assert_eq!(state.kind(), GuardStateKind::Patrol);
        assert_eq!(tick.broadcast, None);
    }

    // ========================================
    // Hearing
    // ========================================

    #[test]
    fn test_heard_intruder_starts_investigate_without_broadcast() {
        let config = GuardConfig::default();
        let mut state = GuardState::patrol(&config);
        let mut route = far_route();
        let intruder = Vec3::new(-5.0, 0.0, 0.0);
        let mut target = target_at(intruder);
        target.noise_radius = 10.0;

        let tick = tick_guard(
            guard(),
            &mut state,
            &mut route,
            &config,
            &pose_at_origin(),
            &target,
            &OpenSpace,
            DT,
        );

        assert_eq!(
            state,
            GuardState::Investigate {
                position: intruder,
                timer: config.investigate_duration
            }
        );
        assert_eq!(tick.broadcast, None);
        assert_eq!(
            tick.command,
            MovementCommand::MoveToPosition {
                target: intruder,
                speed: config.patrol_speed
            }
        );
    }

    #[test]
    fn test_loud_noise_beyond_hearing_range_not_heard() {
        let config = GuardConfig::default();
        let mut state = GuardState::patrol(&config);
        let mut route = far_route();
        let mut target = target_at(Vec3::new(-16.0, 0.0, 0.0));
        target.noise_radius = 100.0;

        tick_guard(
            guard(),
            &mut state,
            &mut route,
            &config,
            &pose_at_origin(),
            &target,
            &OpenSpace,
            DT,
        );

        assert_eq!(state.kind(), GuardStateKind::Patrol);
    }

    // ========================================
    // Chase
    // ========================================

    #[test]
    fn test_chase_updates_last_seen_while_visible() {
        let config = GuardConfig::default();
        let mut state = GuardState::Chase {
            last_seen: Vec3::new(5.0, 0.0, 0.0),
        };
        let mut route = far_route();
        let intruder = Vec3::new(8.0, 0.0, 1.0);

        let tick = tick_guard(
            guard(),
            &mut state,
            &mut route,
            &config,
            &pose_at_origin(),
            &target_at(intruder),
            &OpenSpace,
            DT,
        );

        assert_eq!(state, GuardState::Chase { last_seen: intruder });
        // Продолжение погони не рассылается повторно
        assert_eq!(tick.broadcast, None);
    }

    #[test]
    fn test_lost_sight_investigates_last_seen() {
        let config = GuardConfig::default();
        let last_seen = Vec3::new(5.0, 0.0, 0.0);
        let mut state = GuardState::Chase { last_seen };
        let mut route = far_route();

        let tick = tick_guard(
            guard(),
            &mut state,
            &mut route,
            &config,
            &pose_at_origin(),
            &target_at(Vec3::new(-10.0, 0.0, 0.0)),
            &OpenSpace,
            DT,
        );

        assert_eq!(
            state,
            GuardState::Investigate {
                position: last_seen,
                timer: config.investigate_duration
            }
        );
        assert_eq!(
            tick.command,
            MovementCommand::MoveToPosition {
                target: last_seen,
                speed: config.patrol_speed
            }
        );
    }

    #[test]
    fn test_catch_distance_captures() {
        let config = GuardConfig::default();
        let mut state = GuardState::Chase { last_seen: Vec3::X };
        let mut route = far_route();

        let tick = tick_guard(
            guard(),
            &mut state,
            &mut route,
            &config,
            &pose_at_origin(),
            &target_at(Vec3::new(1.0, 0.0, 0.0)),
            &OpenSpace,
            DT,
        );

        assert!(tick.captured);
        assert!(state.is_chasing());
    }

    #[test]
    fn test_chase_continues_onto_stunned_intruder() {
        let config = GuardConfig::default();
        let mut state = GuardState::Chase { last_seen: Vec3::X };
        let mut route = far_route();
        let mut target = target_at(Vec3::new(1.2, 0.0, 0.0));
        target.is_incapacitated = true;

        let tick = tick_guard(
            guard(),
            &mut state,
            &mut route,
            &config,
            &pose_at_origin(),
            &target,
            &OpenSpace,
            DT,
        );

        assert!(tick.captured);
    }

    // ========================================
    // Patrol / Investigate timing
    // ========================================

    #[test]
    fn test_patrol_waits_at_waypoint_then_advances() {
        let config = GuardConfig::default();
        let mut state = GuardState::patrol(&config);
        let mut route = PatrolRoute::new(vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0)]);
        let quiet = target_at(Vec3::new(-100.0, 0.0, 0.0));

        let tick = tick_guard(guard(), &mut state, &mut route, &config, &pose_at_origin(), &quiet, &OpenSpace, 1.0);
        assert_eq!(route.index, 0);
        assert_eq!(state, GuardState::Patrol { wait_timer: 1.0 });
        assert_eq!(tick.command.destination(), Some(Vec3::ZERO));

        let tick = tick_guard(guard(), &mut state, &mut route, &config, &pose_at_origin(), &quiet, &OpenSpace, 1.0);
        assert_eq!(route.index, 1);
        assert_eq!(state, GuardState::Patrol { wait_timer: config.patrol_wait_time });
        assert_eq!(tick.command.destination(), Some(Vec3::new(0.0, 0.0, 10.0)));
    }

    #[test]
    fn test_empty_route_holds_position() {
        let config = GuardConfig::default();
        let mut state = GuardState::patrol(&config);
        let mut route = PatrolRoute::default();

        let tick = tick_guard(
            guard(),
            &mut state,
            &mut route,
            &config,
            &pose_at_origin(),
            &target_at(Vec3::new(-100.0, 0.0, 0.0)),
            &OpenSpace,
            DT,
        );

        assert_eq!(tick.command, MovementCommand::Idle);
        assert_eq!(state.kind(), GuardStateKind::Patrol);
    }

    #[test]
    fn test_investigate_timer_waits_for_arrival() {
        let config = GuardConfig::default();
        let mut state = GuardState::Investigate {
            position: Vec3::new(0.0, 0.0, 10.0),
            timer: 1.0,
        };
        let mut route = far_route();

        tick_guard(
            guard(),
            &mut state,
            &mut route,
            &config,
            &pose_at_origin(),
            &target_at(Vec3::new(-100.0, 0.0, 0.0)),
            &OpenSpace,
            5.0,
        );

        assert_eq!(
            state,
            GuardState::Investigate {
                position: Vec3::new(0.0, 0.0, 10.0),
                timer: 1.0
            }
        );
    }

    #[test]
    fn test_investigate_returns_to_same_waypoint() {
        let config = GuardConfig::default();
        let mut state = GuardState::Investigate {
            position: Vec3::ZERO,
            timer: 1.0,
        };
        let waypoint = Vec3::new(30.0, 0.0, 30.0);
        let mut route = far_route();
        route.index = 1;
        let quiet = target_at(Vec3::new(-100.0, 0.0, 0.0));

        tick_guard(guard(), &mut state, &mut route, &config, &pose_at_origin(), &quiet, &OpenSpace, 0.5);
        assert_eq!(state.kind(), GuardStateKind::Investigate);

        let tick = tick_guard(guard(), &mut state, &mut route, &config, &pose_at_origin(), &quiet, &OpenSpace, 0.5);
        assert_eq!(state, GuardState::patrol(&config));
        assert_eq!(route.index, 1);
        assert_eq!(tick.command.destination(), Some(waypoint));
    }

    // ========================================
    // Alerts
    // ========================================

    #[test]
    fn test_peer_sighting_within_radius_investigates() {
        let config = GuardConfig::default();
        let mut state = GuardState::patrol(&config);
        let spot = Vec3::new(25.0, 0.0, 0.0);

        let follow_up = receive_alert(
            guard(),
            &mut state,
            &config,
            Vec3::ZERO,
            &AlertEvent::sighting(spot, Entity::from_raw(2)),
        );

        assert_eq!(follow_up, None);
        assert_eq!(
            state,
            GuardState::Investigate {
                position: spot,
                timer: config.investigate_duration
            }
        );
    }

    #[test]
    fn test_distant_sighting_ignored() {
        let config = GuardConfig::default();
        let mut state = GuardState::patrol(&config);

        receive_alert(
            guard(),
            &mut state,
            &config,
            Vec3::ZERO,
            &AlertEvent::sighting(Vec3::new(40.0, 0.0, 0.0), Entity::from_raw(2)),
        );

        assert_eq!(state.kind(), GuardStateKind::Patrol);
    }

    #[test]
    fn test_own_sighting_ignored() {
        let config = GuardConfig::default();
        let mut state = GuardState::Investigate {
            position: Vec3::X,
            timer: 15.0,
        };

        receive_alert(
            guard(),
            &mut state,
            &config,
            Vec3::ZERO,
            &AlertEvent::sighting(Vec3::X, guard()),
        );

        // Увеличенный таймер после близкого шума не сбрасывается
        assert_eq!(
            state,
            GuardState::Investigate {
                position: Vec3::X,
                timer: 15.0
            }
        );
    }

    #[test]
    fn test_chasing_guard_ignores_alerts() {
        let config = GuardConfig::default();
        let chase = GuardState::Chase { last_seen: Vec3::X };
        let mut state = chase;

        receive_alert(
            guard(),
            &mut state,
            &config,
            Vec3::ZERO,
            &AlertEvent::sighting(Vec3::new(3.0, 0.0, 0.0), Entity::from_raw(2)),
        );
        let follow_up = receive_alert(
            guard(),
            &mut state,
            &config,
            Vec3::ZERO,
            &AlertEvent::noise(Vec3::new(2.0, 0.0, 0.0), 20.0),
        );

        assert_eq!(state, chase);
        assert_eq!(follow_up, None);
    }

    #[test]
    fn test_close_noise_searches_longer_and_alerts_others() {
        let config = GuardConfig::default();
        let mut state = GuardState::patrol(&config);
        let spot = Vec3::new(5.0, 0.0, 0.0);

        let follow_up = receive_alert(
            guard(),
            &mut state,
            &config,
            Vec3::ZERO,
            &AlertEvent::noise(spot, 20.0),
        );

        assert_eq!(
            state,
            GuardState::Investigate {
                position: spot,
                timer: 15.0
            }
        );
        assert_eq!(follow_up, Some(AlertEvent::sighting(spot, guard())));
    }

    #[test]
    fn test_mid_range_noise_investigates_normally() {
        let config = GuardConfig::default();
        let mut state = GuardState::patrol(&config);
        let spot = Vec3::new(12.0, 0.0, 0.0);

        let follow_up = receive_alert(
            guard(),
            &mut state,
            &config,
            Vec3::ZERO,
            &AlertEvent::noise(spot, 20.0),
        );

        assert_eq!(follow_up, None);
        assert_eq!(
            state,
            GuardState::Investigate {
                position: spot,
                timer: config.investigate_duration
            }
        );
    }

    #[test]
    fn test_noise_outside_radius_or_silent_ignored() {
        let config = GuardConfig::default();
        let mut state = GuardState::patrol(&config);

        receive_alert(guard(), &mut state, &config, Vec3::ZERO, &AlertEvent::noise(Vec3::new(25.0, 0.0, 0.0), 20.0));
        receive_alert(guard(), &mut state, &config, Vec3::ZERO, &AlertEvent::noise(Vec3::ZERO, 0.0));

        assert_eq!(state.kind(), GuardStateKind::Patrol);
    }

    #[test]
    fn test_newest_cue_wins_and_repeat_is_idempotent() {
        let config = GuardConfig::default();
        let mut state = GuardState::Investigate {
            position: Vec3::X,
            timer: 3.0,
        };
        let alert = AlertEvent::sighting(Vec3::new(0.0, 0.0, 12.0), Entity::from_raw(2));

        receive_alert(guard(), &mut state, &config, Vec3::ZERO, &alert);
        let once = state;
        receive_alert(guard(), &mut state, &config, Vec3::ZERO, &alert);

        assert_eq!(once.investigate_position(), Some(Vec3::new(0.0, 0.0, 12.0)));
        assert_eq!(state, once);
    }

    /// Mock ECS: guards как (entity, state, position)
    struct Squad {
        config: GuardConfig,
        guards: Vec<(Entity, GuardState, Vec3)>,
    }

    impl AlertHandler for Squad {
        fn handle_alert(&mut self, subscriber: Entity, event: &AlertEvent) -> Option<AlertEvent> {
            let (entity, state, position) = self.guards.iter_mut().find(|(e, _, _)| *e == subscriber)?;
            receive_alert(*entity, state, &self.config, *position, event)
        }
    }

    #[test]
    fn test_slap_next_to_guard_wakes_out_of_earshot_peer() {
        let config = GuardConfig::default();
        let near = Entity::from_raw(1);
        let far = Entity::from_raw(2);
        let slap_spot = Vec3::new(3.0, 0.0, 0.0);

        let mut squad = Squad {
            guards: vec![
                (near, GuardState::patrol(&config), Vec3::ZERO),
                // 25 м от удара: шум (20 м) не слышен, sighting (30 м) доходит
                (far, GuardState::patrol(&config), Vec3::new(28.0, 0.0, 0.0)),
            ],
            config,
        };

        let mut bus = AlertBus::new();
        bus.subscribe(near);
        bus.subscribe(far);

        bus.publish(AlertEvent::noise(slap_spot, 20.0), &mut squad);

        assert_eq!(bus.published_count(), 2);
        assert_eq!(
            squad.guards[0].1,
            GuardState::Investigate {
                position: slap_spot,
                timer: 15.0
            }
        );
        assert_eq!(squad.guards[1].1.investigate_position(), Some(slap_spot));
    }

    #[test]
    fn test_close_guards_keep_extended_search_after_peer_sightings() {
        let config = GuardConfig::default();
        let first = Entity::from_raw(1);
        let second = Entity::from_raw(2);

        // Оба внутри 0.4 × 20 м от удара
        let mut squad = Squad {
            guards: vec![
                (first, GuardState::patrol(&config), Vec3::new(7.0, 0.0, 0.0)),
                (second, GuardState::patrol(&config), Vec3::new(0.0, 0.0, 6.0)),
            ],
            config,
        };

        let mut bus = AlertBus::new();
        bus.subscribe(first);
        bus.subscribe(second);

        bus.publish(AlertEvent::noise(Vec3::ZERO, 20.0), &mut squad);

        // noise + два follow-up sighting
        assert_eq!(bus.published_count(), 3);
        // noise → 2, каждый sighting → 2 (свой игнорируется, но доставка есть)
        assert_eq!(bus.delivered_count(), 6);
        for (_, state, _) in &squad.guards {
            assert_eq!(
                *state,
                GuardState::Investigate {
                    position: Vec3::ZERO,
                    timer: 15.0
                }
            );
        }
    }

    #[test]
    fn test_peer_sighting_elsewhere_resets_search_timer() {
        let config = GuardConfig::default();
        let mut state = GuardState::Investigate {
            position: Vec3::new(5.0, 0.0, 0.0),
            timer: 15.0,
        };
        let spot = Vec3::new(0.0, 0.0, 5.0);

        receive_alert(
            guard(),
            &mut state,
            &config,
            Vec3::ZERO,
            &AlertEvent::sighting(spot, Entity::from_raw(7)),
        );

        assert_eq!(
            state,
            GuardState::Investigate {
                position: spot,
                timer: config.investigate_duration
            }
        );
    }
}
