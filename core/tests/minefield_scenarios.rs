use arcadero_core::*;

/// 16x16 board with all 40 mines packed into the bottom rows, so the
/// top-left corner sits in one large connected zero region.
fn bottom_heavy_layout() -> MineLayout {
    let mut mines = Vec::new();
    for x in 0..16 {
        mines.push((x, 13));
        mines.push((x, 14));
    }
    for x in 0..8 {
        mines.push((x, 15));
    }
    assert_eq!(mines.len(), 40);
    MineLayout::from_mine_coords((16, 16), &mines).unwrap()
}

#[test]
fn corner_reveal_floods_the_connected_zero_region() {
    let mut game = MinefieldGame::new(bottom_heavy_layout());

    assert_eq!(game.reveal((0, 0)), RevealOutcome::Revealed);

    // the zero region and its numbered border are fully open
    for y in 0..=12 {
        for x in 0..16 {
            assert!(
                game.tile_at((x, y)).is_open(),
                "({}, {}) should be open",
                x,
                y
            );
        }
    }
    // the flood never crossed into the mined rows
    for y in 13..16 {
        for x in 0..16 {
            assert!(!game.tile_at((x, y)).is_open());
        }
    }
    // border tiles carry their exact neighbor counts
    assert_eq!(game.tile_at((0, 12)), Tile::Open(2));
    assert_eq!(game.tile_at((7, 12)), Tile::Open(3));
    assert_eq!(game.tile_at((5, 11)), Tile::Open(0));
    assert_eq!(game.phase(), GamePhase::Running);
}

#[test]
fn generated_boards_carry_exact_mine_and_neighbor_counts() {
    let config = MinefieldConfig::intermediate();

    for seed in 0..4 {
        let layout = RandomMineGenerator::new(seed).generate(config);

        let mut mines = 0;
        for x in 0..16 {
            for y in 0..16 {
                if layout.contains_mine((x, y)) {
                    mines += 1;
                    continue;
                }
                let mut expected = 0;
                for dx in -1..=1 {
                    for dy in -1..=1 {
                        if (dx, dy) != (0, 0) && layout.contains_mine((x + dx, y + dy)) {
                            expected += 1;
                        }
                    }
                }
                assert_eq!(layout.adjacent_mines((x, y)), expected);
            }
        }
        assert_eq!(mines, 40);
    }
}

#[test]
fn flood_reveal_never_opens_a_mine() {
    let config = MinefieldConfig::intermediate();

    for seed in 0..4 {
        let layout = RandomMineGenerator::new(seed).generate(config);
        let mut game = MinefieldGame::new(layout.clone());

        // reveal every zero-neighbor safe cell
        for x in 0..16 {
            for y in 0..16 {
                if !layout.contains_mine((x, y)) && layout.adjacent_mines((x, y)) == 0 {
                    game.reveal((x, y));
                }
            }
        }

        for x in 0..16 {
            for y in 0..16 {
                if layout.contains_mine((x, y)) {
                    assert!(!game.tile_at((x, y)).is_open());
                }
            }
        }
    }
}

#[test]
fn pointer_input_drives_a_minefield_session() {
    let mut session = Session::new();
    session
        .launch(GameSpec::Minefield(MinefieldConfig::intermediate()), 17)
        .unwrap();

    session.pointer(PointerButton::Secondary, (3, 3));

    let Some(SceneSnapshot::Minefield(snapshot)) = session.snapshot() else {
        panic!("expected a minefield snapshot");
    };
    assert_eq!(snapshot.rows.len(), 16);
    assert_eq!(snapshot.rows[3][3], Tile::Flag);
    assert_eq!(snapshot.flags_left, 39);
    assert_eq!(snapshot.total_mines, 40);

    // unflag, then reveal the same cell
    session.pointer(PointerButton::Secondary, (3, 3));
    session.pointer(PointerButton::Primary, (3, 3));

    let Some(SceneSnapshot::Minefield(snapshot)) = session.snapshot() else {
        panic!("expected a minefield snapshot");
    };
    assert_eq!(snapshot.flags_left, 40);
    assert_ne!(snapshot.rows[3][3], Tile::Closed);
}
