//! Player goal state machine tests

#[cfg(test)]
mod tests {
    use medomed::{
        player::{Goal, GoalOutcome, InputState, Player},
        types::{Rect, SimConfig, Vec2},
    };

    const DT: f32 = 1.0 / 60.0;

    fn config() -> SimConfig {
        SimConfig::default()
    }

    /// Tick until the current goal ends; returns the outcome and tick count.
    fn run_goal(player: &mut Player, walls: &[Rect]) -> (GoalOutcome, usize) {
        let idle = InputState::default();
        for n in 1..=10_000 {
            if let Some(outcome) = player.advance(DT, &idle, walls) {
                return (outcome, n);
            }
        }
        panic!("goal never resolved; player at {}", player.pos());
    }

    // -----------------------------------------------------------------------
    // Forward
    // -----------------------------------------------------------------------

    #[test]
    fn forward_three_tiles_lands_exactly() {
        let mut player = Player::new(Vec2::ZERO, &config());
        player.start_forward(3.0);
        assert_eq!(player.goal(), Some(Goal::Position(Vec2::new(96.0, 0.0))));

        let (outcome, _) = run_goal(&mut player, &[]);
        assert_eq!(outcome, GoalOutcome::Reached);
        assert_eq!(player.pos(), Vec2::new(96.0, 0.0));
        assert!(player.is_idle());
        assert_eq!(player.velocity(), Vec2::ZERO);
    }

    #[test]
    fn forward_follows_heading() {
        let mut player = Player::new(Vec2::new(200.0, 200.0), &config()).with_heading(90.0);
        player.start_forward(2.0);
        let (outcome, _) = run_goal(&mut player, &[]);
        assert_eq!(outcome, GoalOutcome::Reached);
        // 90° points up the screen
        assert_eq!(player.pos(), Vec2::new(200.0, 136.0));
    }

    #[test]
    fn forward_diagonal_reaches_target() {
        let mut player = Player::new(Vec2::new(200.0, 200.0), &config()).with_heading(45.0);
        player.start_forward(2.0);
        let Some(Goal::Position(target)) = player.goal() else {
            panic!("expected a position goal");
        };
        let (outcome, _) = run_goal(&mut player, &[]);
        assert_eq!(outcome, GoalOutcome::Reached);
        assert_eq!(player.pos(), target);
        assert!((target.x - 245.2548).abs() < 1e-3);
        assert!((target.y - 154.7452).abs() < 1e-3);
    }

    #[test]
    fn forward_zero_completes_in_one_tick() {
        let mut player = Player::new(Vec2::new(50.0, 50.0), &config());
        player.start_forward(0.0);
        let (outcome, ticks) = run_goal(&mut player, &[]);
        assert_eq!(outcome, GoalOutcome::Reached);
        assert_eq!(ticks, 1);
        assert_eq!(player.pos(), Vec2::new(50.0, 50.0));
    }

    #[test]
    fn forward_takes_time_at_robot_speed() {
        let mut player = Player::new(Vec2::ZERO, &config());
        player.start_forward(1.0);
        let (_, ticks) = run_goal(&mut player, &[]);
        // 32 px at 100 px/s is a little over 19 ticks at 60 Hz
        assert_eq!(ticks, 20);
    }

    // -----------------------------------------------------------------------
    // Collisions
    // -----------------------------------------------------------------------

    #[test]
    fn wall_ahead_stops_flush_against_left_edge() {
        let wall = Rect::new(200.0, 80.0, 32.0, 40.0);
        let mut player = Player::new(Vec2::new(100.0, 100.0), &config());
        player.start_forward(50.0);

        let (outcome, _) = run_goal(&mut player, &[wall]);
        assert_eq!(outcome, GoalOutcome::HitWall);
        assert_eq!(player.hit_rect().right(), wall.left());
        assert!(!player.hit_rect().overlaps(&wall));
        assert!(player.is_idle());
    }

    #[test]
    fn wall_behind_stops_flush_against_right_edge() {
        let wall = Rect::new(0.0, 0.0, 32.0, 480.0);
        let mut player = Player::new(Vec2::new(100.0, 100.0), &config()).with_heading(180.0);
        player.start_forward(50.0);

        let (outcome, _) = run_goal(&mut player, &[wall]);
        assert_eq!(outcome, GoalOutcome::HitWall);
        assert_eq!(player.hit_rect().left(), wall.right());
    }

    #[test]
    fn wall_above_and_below_clamp_on_y() {
        let ceiling = Rect::new(0.0, 0.0, 640.0, 32.0);
        let floor = Rect::new(0.0, 300.0, 640.0, 32.0);

        let mut up = Player::new(Vec2::new(100.0, 100.0), &config()).with_heading(90.0);
        up.start_forward(50.0);
        assert_eq!(run_goal(&mut up, &[ceiling, floor]).0, GoalOutcome::HitWall);
        assert_eq!(up.hit_rect().top(), ceiling.bottom());

        let mut down = Player::new(Vec2::new(100.0, 100.0), &config()).with_heading(270.0);
        down.start_forward(50.0);
        assert_eq!(run_goal(&mut down, &[ceiling, floor]).0, GoalOutcome::HitWall);
        assert_eq!(down.hit_rect().bottom(), floor.top());
    }

    #[test]
    fn thin_wall_is_not_tunnelled_at_large_dt() {
        let wall = Rect::new(150.0, 0.0, 4.0, 480.0);
        let mut player = Player::new(Vec2::new(100.0, 100.0), &config());
        player.start_forward(10.0);
        let idle = InputState::default();
        let mut outcome = None;
        for _ in 0..100 {
            outcome = player.advance(0.1, &idle, &[wall]);
            if outcome.is_some() {
                break;
            }
        }
        assert_eq!(outcome, Some(GoalOutcome::HitWall));
        assert!(player.pos().x < wall.left());
    }

    #[test]
    fn touching_a_wall_edge_is_not_a_collision() {
        // Wall runs alongside the path, sharing an edge with the hit-rectangle.
        let wall = Rect::new(0.0, 110.0, 640.0, 32.0);
        let mut player = Player::new(Vec2::new(100.0, 100.0), &config());
        player.start_forward(3.0);
        let (outcome, _) = run_goal(&mut player, &[wall]);
        assert_eq!(outcome, GoalOutcome::Reached);
        assert_eq!(player.pos(), Vec2::new(196.0, 100.0));
    }

    // -----------------------------------------------------------------------
    // Rotation
    // -----------------------------------------------------------------------

    #[test]
    fn turn_to_current_heading_is_immediate() {
        let mut player = Player::new(Vec2::new(10.0, 10.0), &config()).with_heading(90.0);
        player.start_turn(90.0);
        let (outcome, ticks) = run_goal(&mut player, &[]);
        assert_eq!(outcome, GoalOutcome::AngleReached);
        assert_eq!(ticks, 1);
        assert_eq!(player.pos(), Vec2::new(10.0, 10.0));
        assert_eq!(player.rot(), 90.0);
    }

    #[test]
    fn turn_takes_shortest_way_across_zero() {
        let mut player = Player::new(Vec2::ZERO, &config()).with_heading(350.0);
        player.start_turn(10.0);

        let idle = InputState::default();
        player.advance(DT, &idle, &[]);
        assert!((player.rot() - 351.0).abs() < 1e-3, "rot = {}", player.rot());

        let (outcome, ticks) = run_goal(&mut player, &[]);
        assert_eq!(outcome, GoalOutcome::AngleReached);
        assert_eq!(player.rot(), 10.0);
        // 20° at 60°/s: roughly 20 ticks, never the 340° long way round
        assert!(ticks < 25, "took {} ticks", ticks);
    }

    #[test]
    fn turn_normalises_target() {
        let mut player = Player::new(Vec2::ZERO, &config());
        player.start_turn(-90.0);
        assert_eq!(player.goal(), Some(Goal::Heading(270.0)));
        run_goal(&mut player, &[]);
        assert_eq!(player.rot(), 270.0);

        player.start_turn(720.0 + 45.0);
        assert_eq!(player.goal(), Some(Goal::Heading(45.0)));
    }

    #[test]
    fn rotation_never_moves_the_player() {
        let mut player = Player::new(Vec2::new(64.0, 64.0), &config());
        player.start_turn(180.0);
        run_goal(&mut player, &[]);
        assert_eq!(player.pos(), Vec2::new(64.0, 64.0));
        assert_eq!(player.rot(), 180.0);
    }

    // -----------------------------------------------------------------------
    // Manual control
    // -----------------------------------------------------------------------

    #[test]
    fn keyboard_moves_and_rotates_when_idle() {
        let mut player = Player::new(Vec2::new(100.0, 100.0), &config());
        let forward = InputState {
            forward: true,
            ..Default::default()
        };
        assert_eq!(player.advance(0.05, &forward, &[]), None);
        assert_eq!(player.pos(), Vec2::new(120.0, 100.0));

        let left = InputState {
            turn_left: true,
            ..Default::default()
        };
        player.advance(0.1, &left, &[]);
        assert!((player.rot() - 25.0).abs() < 1e-3);

        let back = InputState {
            backward: true,
            ..Default::default()
        };
        let before = player.pos();
        player.advance(0.1, &back, &[]);
        let moved = before.distance(player.pos());
        assert!((moved - 20.0).abs() < 1e-3, "moved {}", moved);
    }

    #[test]
    fn goal_overrides_keyboard() {
        let mut player = Player::new(Vec2::new(100.0, 100.0), &config());
        player.start_turn(90.0);
        let forward = InputState {
            forward: true,
            ..Default::default()
        };
        player.advance(DT, &forward, &[]);
        assert_eq!(player.pos(), Vec2::new(100.0, 100.0));
    }

    // -----------------------------------------------------------------------
    // Feasibility
    // -----------------------------------------------------------------------

    #[test]
    fn can_forward_sees_wall_without_moving() {
        let wall = Rect::new(200.0, 80.0, 32.0, 40.0);
        let bounds = Rect::new(0.0, 0.0, 640.0, 480.0);
        let player = Player::new(Vec2::new(100.0, 100.0), &config());

        assert!(player.can_forward(1.0, &[wall], &bounds));
        assert!(player.can_forward(2.5, &[wall], &bounds));
        assert!(!player.can_forward(3.0, &[wall], &bounds));
        assert!(!player.can_forward(50.0, &[wall], &bounds));
        assert!(player.can_forward(-2.0, &[wall], &bounds));
        assert_eq!(player.pos(), Vec2::new(100.0, 100.0));
        assert!(player.is_idle());
    }

    #[test]
    fn can_forward_agrees_with_forward() {
        let wall = Rect::new(300.0, 0.0, 32.0, 480.0);
        let bounds = Rect::new(0.0, 0.0, 640.0, 480.0);
        for tiles in [1.0, 4.0, 5.0, 6.0, 9.0] {
            let mut player = Player::new(Vec2::new(130.0, 200.0), &config()).with_heading(20.0);
            let predicted = player.can_forward(tiles, &[wall], &bounds);
            player.start_forward(tiles);
            let (outcome, _) = run_goal(&mut player, &[wall]);
            assert_eq!(
                predicted,
                outcome == GoalOutcome::Reached,
                "tiles = {}",
                tiles
            );
        }
    }
}
