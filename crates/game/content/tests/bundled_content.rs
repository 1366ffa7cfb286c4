use survivor_content::ContentFactory;
use survivor_core::{PathOptions, PursuitConfig, TileCoord, find_path};

#[test]
fn bundled_config_matches_defaults() {
    let config = ContentFactory::bundled().load_config().unwrap();
    assert_eq!(config, PursuitConfig::default());
}

#[test]
fn street_level_is_connected_end_to_end() {
    let factory = ContentFactory::bundled();
    let street = factory.load_level("street").unwrap();

    assert_eq!(street.dimensions.width, 40);
    assert_eq!(street.dimensions.height, 20);
    assert_eq!(street.doors, vec![TileCoord::new(14, 7), TileCoord::new(33, 7)]);
    assert!(street.grid.is_walkable(street.player_start));
    assert!(street.grid.is_walkable(street.enemy_start));

    let path = find_path(
        &street.grid,
        street.enemy_start,
        street.player_start,
        &PathOptions::default(),
    );
    assert_eq!(path.goal(), Some(street.player_start));
}

#[test]
fn clinic_room_declares_population() {
    let clinic = ContentFactory::bundled().load_level("clinic").unwrap();

    assert_eq!(clinic.population, Some((1, 3)));
    assert_eq!(clinic.doors, vec![TileCoord::new(10, 8)]);
    // Border walls plus furniture.
    assert!(!clinic.grid.is_walkable(TileCoord::new(0, 0)));
    assert!(!clinic.grid.is_walkable(TileCoord::new(5, 3)));
    assert!(clinic.grid.is_walkable(clinic.enemy_start));
}

#[test]
fn every_bundled_level_loads() {
    let factory = ContentFactory::bundled();
    let names = factory.level_names().unwrap();
    assert_eq!(names, vec!["clinic", "street"]);
    for name in names {
        factory.load_level(&name).unwrap();
    }
}
