//! Island travel integration tests

use rand::Rng;

use skirmish::battle::{ItemKind, ShotOutcome, Soldier, WeaponKind};
use skirmish::campaign::Island;
use skirmish::core::*;

fn config(enemies: u32) -> IslandConfig {
    IslandConfig {
        enemies_per_sector: enemies,
        generation: GenerationConfig {
            width: 40,
            height: 20,
            coast_width: 3,
            coast_perturbations: 12,
            houses: 1,
            ..GenerationConfig::default()
        },
        ..IslandConfig::default()
    }
}

fn squad(island: &Island) -> Vec<Soldier> {
    island
        .active()
        .soldiers()
        .iter()
        .filter(|s| s.team == TeamId::PLAYER)
        .cloned()
        .collect()
}

#[test]
fn test_squad_keeps_identity_across_sectors() {
    let mut island = Island::new(&config(0), 314).unwrap();
    let before = squad(&island);
    assert_eq!(before.len(), 4);

    let carrier = before[0].id;
    let rifle = island
        .active_mut()
        .give_item(carrier, ItemKind::Weapon(WeaponKind::Rifle))
        .unwrap();

    island.travel(Direction::East).unwrap();
    assert_eq!(island.active_coord(), Position::new(1, 1));
    assert!(!island.active().is_friendly());
    assert!(island.is_generated(Position::new(0, 1)));

    let after = squad(&island);
    assert_eq!(after.len(), before.len());
    for (old, new) in before.iter().zip(&after) {
        assert_eq!(old.id, new.id);
        assert_eq!(old.attributes, new.attributes);
        assert_eq!(new.position.x, 0, "enters on the west edge");
    }
    let carried = island.active().soldier(carrier).unwrap();
    assert_eq!(carried.wielded_item().map(|i| i.id), Some(rifle));

    assert_eq!(island.active().current_team(), TeamId::PLAYER);
    assert_eq!(island.active().current_soldier().map(|s| s.id), Some(before[0].id));
}

#[test]
fn test_return_trip_reuses_sector() {
    let mut island = Island::new(&config(0), 99).unwrap();
    let width = island.config().generation.width as i32;

    island.travel(Direction::East).unwrap();
    island.travel(Direction::West).unwrap();

    assert_eq!(island.active_coord(), island.start_coord());
    assert!(island.active().is_friendly());
    let back = squad(&island);
    assert_eq!(back.len(), 4);
    assert!(back.iter().all(|s| s.position.x == width - 1), "enters on the east edge");

    // The hostile sector kept no player soldiers behind
    island.travel(Direction::East).unwrap();
    assert_eq!(squad(&island).len(), 4);
}

#[test]
fn test_travel_blocked_by_living_enemies() {
    let mut island = Island::new(&config(4), 7).unwrap();
    island.travel(Direction::East).unwrap();
    assert_eq!(island.active().soldiers_in_team(TeamId::ENEMY).len(), 4);

    assert!(matches!(island.travel(Direction::East), Err(SkirmishError::TravelBlocked)));
    assert!(matches!(island.travel(Direction::West), Err(SkirmishError::TravelBlocked)));
    assert_eq!(island.active_coord(), Position::new(1, 1));
}

#[test]
fn test_enemies_start_on_east_half() {
    let mut island = Island::new(&config(4), 21).unwrap();
    island.travel(Direction::East).unwrap();
    let half = island.config().generation.width as i32 / 2;
    for enemy in island.active().soldiers_in_team(TeamId::ENEMY) {
        assert!(enemy.position.x >= half);
    }
}

#[test]
fn test_off_island_travel_refused() {
    let mut island = Island::new(&config(0), 3).unwrap();
    assert!(matches!(island.travel(Direction::West), Err(SkirmishError::OffIsland)));
}

#[test]
fn test_island_snapshot_replays_identically() {
    let mut island = Island::new(&config(4), 2718).unwrap();
    let json = serde_json::to_string(&island).unwrap();
    let mut restored: Island = serde_json::from_str(&json).unwrap();

    island.travel(Direction::East).unwrap();
    restored.travel(Direction::East).unwrap();

    assert_eq!(restored.active().soldiers(), island.active().soldiers());
    assert_eq!(restored.active().grid, island.active().grid);
    assert_eq!(restored.rng_mut().gen::<u64>(), island.rng_mut().gen::<u64>());
}

#[test]
fn test_shot_resolved_with_island_rng() {
    let mut island = Island::new(&config(4), 55).unwrap();
    island.travel(Direction::East).unwrap();

    let (bf, rng) = island.active_with_rng();
    let shooter = bf.current_soldier().map(|s| (s.id, s.current_aps)).unwrap();
    let target = bf.soldiers_in_team(TeamId::ENEMY)[0].position;
    bf.shoot(target, 2).unwrap();
    assert_eq!(bf.soldier(shooter.0).unwrap().current_aps, shooter.1 - 10);

    let mut last = None;
    while let Some(step) = bf.advance_shot(rng) {
        last = Some(step.outcome);
    }
    assert!(matches!(
        last,
        Some(ShotOutcome::Hit { .. } | ShotOutcome::Blocked | ShotOutcome::Missed)
    ));
    assert!(island.active().pending_shot().is_none());
}

#[test]
fn test_sample_config_loads() {
    let config = IslandConfig::load("data/island.toml").unwrap();
    let island = Island::new(&config, 1).unwrap();
    assert_eq!(island.active().soldiers_in_team(TeamId::PLAYER).len(), 4);
}
