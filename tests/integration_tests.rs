//! Integration tests - whole rounds driven through `PlayState::tick`

use proptest::prelude::*;

use tetrion::core::{Grid, Mode, PlayState, Randomizer, Rules};
use tetrion::types::{
    Button, Direction, Effect, InputFrame, Mino, Outcome, PieceType, PlayerState, Spin,
    PIECE_TYPE_COUNT, SPAWN_X, SPAWN_Y, SUBGRID_UNIT,
};

fn idle() -> InputFrame {
    InputFrame::new()
}

fn press(buttons: &[Button]) -> InputFrame {
    let mut frame = InputFrame::new();
    for &b in buttons {
        frame.press(b);
    }
    frame
}

fn release(buttons: &[Button]) -> InputFrame {
    let mut frame = InputFrame::new();
    for &b in buttons {
        frame.release(b);
    }
    frame
}

/// A round whose first piece is guaranteed to be `piece`
fn round_starting_with(piece: PieceType, rules: Rules, grid: Grid) -> PlayState {
    let mut tokens = [0; PIECE_TYPE_COUNT];
    tokens[piece.index()] = 35;
    let randomizer = Randomizer::with_tokens(31337, tokens).unwrap();
    PlayState::from_parts(rules, grid, randomizer)
}

#[test]
fn test_zero_gravity_piece_stays_at_spawn() {
    let mut play = PlayState::new(1, Rules::default().with_constant_gravity(0));

    for _ in 0..1000 {
        let effects = play.tick(&idle());
        assert!(effects.is_empty());
        assert_eq!(play.player().position(), (SPAWN_X, SPAWN_Y));
        assert_eq!(play.player().state(), PlayerState::Active);
    }
    assert_eq!(play.pieces(), 1);
    assert_eq!(play.grid(), &Grid::new());
}

proptest! {
    #[test]
    fn gravity_drops_floor_of_k_times_rate(gravity in 1u32..=600, k_raw in 0u32..10_000) {
        // stay clear of the floor: a fresh piece has 18 rows to fall
        let limit = 17 * SUBGRID_UNIT / gravity;
        let k = 1 + k_raw % limit.max(1);
        prop_assume!(k * gravity / SUBGRID_UNIT <= 17);

        let mut play = PlayState::new(3, Rules::default().with_constant_gravity(gravity));
        for _ in 0..k {
            play.tick(&idle());
        }

        let dropped = (SPAWN_Y - play.player().position().1) as u32;
        prop_assert_eq!(dropped, k * gravity / SUBGRID_UNIT);
        prop_assert_eq!(play.snapshot().timers.y_sub, (k * gravity) % SUBGRID_UNIT);
    }
}

#[test]
fn test_gravity_ramps_on_spawn() {
    let rules = Rules::default();
    let mut play = PlayState::new(8, rules);
    assert_eq!(play.gravity(), rules.gravity.initial);

    play.tick(&idle());
    assert_eq!(play.gravity(), rules.gravity.initial + rules.gravity.increment);
}

#[test]
fn test_single_line_clear() {
    let grid = Grid::from_rows(&[
        "#.........", // row 1: marker
        "#########.", // row 0: one gap on the right
    ]);
    let mut play = round_starting_with(PieceType::I, Rules::default(), grid);

    // IRS: spawn already standing up
    play.tick(&press(&[Button::RotCw]));
    assert_eq!(play.player().piece(), Some(PieceType::I));
    assert_eq!(play.player().spin(), Spin::R90);
    assert_eq!(play.player().position().0, 5);

    let mut step = release(&[Button::RotCw]);
    step.press(Button::Right);
    play.tick(&step);
    for _ in 0..3 {
        play.tick(&release(&[Button::Right]));
        play.tick(&press(&[Button::Right]));
    }
    play.tick(&release(&[Button::Right]));
    assert_eq!(play.player().position().0, 9);

    let effects = play.tick(&press(&[Button::HardDrop]));
    assert!(effects
        .iter()
        .any(|e| matches!(e, Effect::LockFlash { piece: PieceType::I, .. })));
    assert!(effects.contains(&Effect::LineClear { row: 0 }));
    assert_eq!(play.player().state(), PlayerState::Clear);
    play.tick(&release(&[Button::HardDrop]));

    let mut thumped = false;
    for _ in 0..100 {
        let effects = play.tick(&idle());
        if effects.contains(&Effect::Thump { row: 0 }) {
            thumped = true;
            break;
        }
    }
    assert!(thumped);
    assert_eq!(play.lines(), 1);

    let g = play.grid();
    // old row 1 moved down: marker plus the lowest remaining I cell
    assert_eq!(g.get(0, 0), Mino::Garbage);
    assert_eq!(g.get(9, 0), Mino::I);
    assert!((1..9).all(|x| g.get(x, 0).is_empty()));
    assert_eq!(g.get(9, 1), Mino::I);
    assert_eq!(g.get(9, 2), Mino::I);
    assert_eq!(g.get(9, 3), Mino::Empty);
    assert_eq!(g.stack_height(), 3);
}

#[test]
fn test_sprint_completes_on_goal() {
    let grid = Grid::from_rows(&["#########."]);
    let rules = Rules::default()
        .with_constant_gravity(0)
        .with_mode(Mode::Sprint { lines: 1 });
    let mut play = round_starting_with(PieceType::I, rules, grid);

    play.tick(&press(&[Button::RotCw]));
    let mut step = release(&[Button::RotCw]);
    step.press(Button::Right);
    play.tick(&step);
    for _ in 0..3 {
        play.tick(&release(&[Button::Right]));
        play.tick(&press(&[Button::Right]));
    }
    play.tick(&release(&[Button::Right]));
    play.tick(&press(&[Button::HardDrop]));
    play.tick(&release(&[Button::HardDrop]));

    for _ in 0..100 {
        if play.is_over() {
            break;
        }
        play.tick(&idle());
    }
    assert_eq!(play.outcome(), Some(Outcome::Completed));
    assert_eq!(play.lines(), 1);
}

#[test]
fn test_same_tick_left_and_right_shift_once() {
    let mut play = PlayState::new(21, Rules::default());
    play.tick(&idle());

    let effects = play.tick(&press(&[Button::Right, Button::Left]));
    let slides: Vec<_> = effects
        .iter()
        .filter(|e| matches!(e, Effect::Slide { .. }))
        .collect();
    assert_eq!(slides, [&Effect::Slide { direction: Direction::Left }]);
    assert_eq!(play.player().position().0, SPAWN_X - 1);
}

#[test]
fn test_autoshift_charges_then_repeats() {
    let rules = Rules::default();
    let mut play = PlayState::new(5, rules);
    play.tick(&idle());

    play.tick(&press(&[Button::Right]));
    assert_eq!(play.player().position().0, SPAWN_X + 1);

    for _ in 1..rules.das_charge {
        play.tick(&idle());
        assert_eq!(play.player().position().0, SPAWN_X + 1);
    }
    play.tick(&idle());
    assert_eq!(play.player().position().0, SPAWN_X + 2);
    play.tick(&idle());
    assert_eq!(play.player().position().0, SPAWN_X + 3);
}

#[test]
fn test_release_discards_partial_charge() {
    let rules = Rules::default().with_constant_gravity(0);
    let mut play = PlayState::new(5, rules);
    play.tick(&idle());

    play.tick(&press(&[Button::Right]));
    for _ in 0..rules.das_charge / 2 {
        play.tick(&idle());
    }
    play.tick(&release(&[Button::Right]));
    assert_eq!(play.player().autoshift_charge(), 0);
    assert_eq!(play.player().position().0, SPAWN_X + 1);

    // the re-press shifts once and charges from scratch
    play.tick(&press(&[Button::Right]));
    assert_eq!(play.player().position().0, SPAWN_X + 2);
    for _ in 1..rules.das_charge {
        play.tick(&idle());
        assert_eq!(play.player().position().0, SPAWN_X + 2);
    }
    play.tick(&idle());
    assert_eq!(play.player().position().0, SPAWN_X + 3);
}

#[test]
fn test_opposite_press_resets_charge() {
    let rules = Rules::default().with_constant_gravity(0);
    let mut play = PlayState::new(8, rules);
    play.tick(&idle());

    play.tick(&press(&[Button::Right]));
    for _ in 0..rules.das_charge {
        play.tick(&idle());
    }
    assert_eq!(play.player().position().0, SPAWN_X + 2);

    // Right stays held; Left takes over with a single direct shift
    let effects = play.tick(&press(&[Button::Left]));
    let slides: Vec<_> = effects
        .iter()
        .filter(|e| matches!(e, Effect::Slide { .. }))
        .collect();
    assert_eq!(slides, [&Effect::Slide { direction: Direction::Left }]);
    assert_eq!(play.player().position().0, SPAWN_X + 1);
    assert_eq!(play.player().autoshift_charge(), 0);

    for _ in 1..rules.das_charge {
        play.tick(&idle());
        assert_eq!(play.player().position().0, SPAWN_X + 1);
    }
    play.tick(&idle());
    assert_eq!(play.player().position().0, SPAWN_X);
}

#[test]
fn test_releasing_newer_direction_hands_back_with_fresh_charge() {
    let rules = Rules::default().with_constant_gravity(0);
    let mut play = PlayState::new(13, rules);
    play.tick(&idle());

    play.tick(&press(&[Button::Left]));
    for _ in 0..5 {
        play.tick(&idle());
    }
    assert_eq!(play.player().position().0, SPAWN_X - 1);

    play.tick(&press(&[Button::Right]));
    assert_eq!(play.player().position().0, SPAWN_X);

    // Left is back in control but was not pressed this tick: no direct shift
    let effects = play.tick(&release(&[Button::Right]));
    assert!(!effects.iter().any(|e| matches!(e, Effect::Slide { .. })));
    assert_eq!(play.player().autoshift_direction(), Some(Direction::Left));
    assert_eq!(play.player().autoshift_charge(), 1);
    assert_eq!(play.player().position().0, SPAWN_X);

    for _ in 2..rules.das_charge {
        play.tick(&idle());
        assert_eq!(play.player().position().0, SPAWN_X);
    }
    play.tick(&idle());
    assert_eq!(play.player().position().0, SPAWN_X - 1);
}

#[test]
fn test_autoshift_repeat_interval() {
    let rules = Rules {
        das_repeat: 3,
        ..Rules::default().with_constant_gravity(0)
    };
    let mut play = PlayState::new(5, rules);
    play.tick(&idle());

    play.tick(&press(&[Button::Right]));
    for _ in 0..rules.das_charge {
        play.tick(&idle());
    }
    // charged, first repeat interval under way
    assert_eq!(play.player().position().0, SPAWN_X + 1);

    play.tick(&idle());
    assert_eq!(play.player().position().0, SPAWN_X + 1);
    play.tick(&idle());
    assert_eq!(play.player().position().0, SPAWN_X + 2);

    // then one shift every third tick
    for _ in 1..rules.das_repeat {
        play.tick(&idle());
        assert_eq!(play.player().position().0, SPAWN_X + 2);
    }
    play.tick(&idle());
    assert_eq!(play.player().position().0, SPAWN_X + 3);
}

#[test]
fn test_spawn_delay_and_short_circuit() {
    let rules = Rules::default();

    // Without input the next piece waits out the full delay.
    let mut play = PlayState::new(11, rules);
    play.tick(&idle());
    play.tick(&press(&[Button::HardDrop]));
    assert_eq!(play.player().state(), PlayerState::Spawn);
    // the release tick is the first tick of the delay
    play.tick(&release(&[Button::HardDrop]));
    for _ in 2..rules.spawn_delay {
        play.tick(&idle());
        assert_eq!(play.player().state(), PlayerState::Spawn);
    }
    play.tick(&idle());
    assert_eq!(play.player().state(), PlayerState::Active);
    assert_eq!(play.pieces(), 2);

    // A rotation press spawns at once, pre-rotated.
    let mut play = PlayState::new(11, rules);
    play.tick(&idle());
    play.tick(&press(&[Button::HardDrop]));
    play.tick(&release(&[Button::HardDrop]));
    play.tick(&press(&[Button::RotCcw]));
    assert_eq!(play.player().state(), PlayerState::Active);
    assert_eq!(play.player().spin(), Spin::R270);
    assert_eq!(play.pieces(), 2);
}

#[test]
fn test_soft_drop_builds_drop_bonus() {
    let mut play = PlayState::new(17, Rules::default().with_constant_gravity(0));
    play.tick(&idle());
    play.tick(&press(&[Button::SoftDrop]));
    for _ in 0..4 {
        play.tick(&idle());
    }
    assert_eq!(play.player().position().1, SPAWN_Y - 5);
    assert_eq!(play.player().drop_bonus(), 5);
}

#[test]
fn test_grounded_piece_locks_after_delay() {
    let rules = Rules::default().with_constant_gravity(20 * SUBGRID_UNIT);
    let mut play = PlayState::new(2, rules);

    // lands on the spawn tick
    play.tick(&idle());
    assert_eq!(play.ghost_y(), Some(play.player().position().1));

    let mut ticks = 1;
    while play.player().state() == PlayerState::Active {
        play.tick(&idle());
        ticks += 1;
        assert!(ticks < 100);
    }
    // grounded on tick 1, counted lock_delay + 1 times
    assert_eq!(ticks, rules.lock_delay + 1);
    assert_eq!(play.player().state(), PlayerState::Spawn);
}

#[test]
fn test_stack_to_the_top_ends_round() {
    let rules = Rules {
        spawn_delay: 0,
        ..Rules::default().with_constant_gravity(20 * SUBGRID_UNIT)
    };
    let mut play = PlayState::new(123, rules);

    let mut hard_drop_held = false;
    for _ in 0..5000 {
        if play.is_over() {
            break;
        }
        let frame = if hard_drop_held {
            release(&[Button::HardDrop])
        } else {
            press(&[Button::HardDrop])
        };
        hard_drop_held = !hard_drop_held;
        play.tick(&frame);
    }
    assert_eq!(play.outcome(), Some(Outcome::ToppedOut));
    assert_eq!(play.player().state(), PlayerState::GameOver);

    let before = play.snapshot();
    assert!(play.tick(&idle()).is_empty());
    assert_eq!(play.snapshot(), before);
}
