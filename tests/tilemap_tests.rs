//! Map loading and camera tests

#[cfg(test)]
mod tests {
    use medomed::{
        entity::World,
        error::MapError,
        tilemap::{names, Camera, MapData, MapGeometry, MapObject, MapSource, ObjectMap, TextGridMap},
        types::{Rect, SimConfig, Vec2},
    };

    // -----------------------------------------------------------------------
    // Text grid maps
    // -----------------------------------------------------------------------

    #[test]
    fn grid_glyphs_become_objects() {
        let map = TextGridMap::parse("1111\n1PA1\n1MG1\n1111\n\n", 32.0);
        let data = map.load().unwrap();

        assert_eq!(data.width, 128.0);
        assert_eq!(data.height, 128.0);
        assert!(data.visible_walls);
        assert_eq!(data.objects_named(names::WALL).count(), 12);

        let player = data.objects_named(names::PLAYER).next().unwrap();
        assert_eq!(player.rect(), Rect::new(32.0, 32.0, 32.0, 32.0));
        assert_eq!(player.center(), Vec2::new(48.0, 48.0));

        let apple = data.objects_named(names::APPLE).next().unwrap();
        assert_eq!(apple.center(), Vec2::new(80.0, 48.0));
        assert_eq!(data.objects_named(names::MOB).count(), 1);
        assert_eq!(data.objects_named(names::GOAL).count(), 1);
    }

    #[test]
    fn ragged_rows_use_longest_width() {
        let data = TextGridMap::parse("1111111\n1P\n111", 16.0).load().unwrap();
        assert_eq!(data.width, 7.0 * 16.0);
        assert_eq!(data.height, 3.0 * 16.0);
        assert_eq!(data.geometry().tile_width, 7);
    }

    #[test]
    fn unknown_glyph_is_located() {
        let err = TextGridMap::parse("111\n1P1\n1?1", 32.0).load().unwrap_err();
        match err {
            MapError::UnknownGlyph { glyph, row, col } => {
                assert_eq!(glyph, '?');
                assert_eq!(row, 2);
                assert_eq!(col, 1);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn empty_maps_are_rejected() {
        assert!(matches!(
            TextGridMap::parse("", 32.0).load(),
            Err(MapError::Empty)
        ));
        assert!(matches!(
            TextGridMap::parse("\n\n   \n", 32.0).load(),
            Err(MapError::Empty)
        ));
        assert!(matches!(
            ObjectMap::from_json(r#"{"tile_size":32,"width":64,"height":64,"objects":[]}"#)
                .unwrap()
                .load(),
            Err(MapError::Empty)
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = TextGridMap::from_file("/nonexistent/level.txt", 32.0)
            .err()
            .expect("missing file");
        assert!(matches!(err, MapError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/level.txt"));
    }

    #[test]
    fn shipped_levels_load() {
        let root = env!("CARGO_MANIFEST_DIR");
        let config = SimConfig::default();

        let grid = TextGridMap::from_file(format!("{}/levels/level_1.txt", root), 32.0).unwrap();
        let (world, _) = World::from_map(&grid.load().unwrap(), &config).unwrap();
        assert!(world.entities.walls().count() > 0);
        assert!(grid.describe().contains("level_1.txt"));

        let objects = ObjectMap::from_file(format!("{}/levels/level_2.json", root)).unwrap();
        let data = objects.load().unwrap();
        assert!(!data.visible_walls);
        let (world, _) = World::from_map(&data, &config).unwrap();
        assert!(world.entities.walls().all(|w| !w.visible));
        assert!(world.item_count() > 0);
    }

    // -----------------------------------------------------------------------
    // World construction
    // -----------------------------------------------------------------------

    #[test]
    fn world_requires_player_spawn() {
        let data = TextGridMap::parse("111\n1A1\n111", 32.0).load().unwrap();
        let result = World::from_map(&data, &SimConfig::default());
        assert!(matches!(result, Err(MapError::MissingPlayer)));
    }

    #[test]
    fn world_rejects_walls_outside_bounds() {
        let json = r#"{
            "tile_size": 32,
            "width": 100,
            "height": 100,
            "objects": [
                { "name": "player", "x": 10, "y": 10, "width": 20, "height": 20 },
                { "name": "wall", "x": 90, "y": 0, "width": 32, "height": 32 }
            ]
        }"#;
        let data = ObjectMap::from_json(json).unwrap().load().unwrap();
        let result = World::from_map(&data, &SimConfig::default());
        assert!(matches!(result, Err(MapError::WallOutOfBounds { .. })));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            ObjectMap::from_json("{ not json"),
            Err(MapError::Json(_))
        ));
    }

    #[test]
    fn world_spawns_entities_at_object_centres() {
        let data = MapData {
            tile_size: 32.0,
            width: 320.0,
            height: 320.0,
            objects: vec![
                MapObject::new(names::PLAYER, Rect::new(0.0, 0.0, 64.0, 64.0)),
                MapObject::new(names::MOB, Rect::new(100.0, 100.0, 32.0, 32.0)),
                MapObject::new(names::APPLE, Rect::new(200.0, 40.0, 16.0, 16.0)),
            ],
            visible_walls: false,
        };
        let (world, spawn) = World::from_map(&data, &SimConfig::default()).unwrap();
        assert_eq!(spawn, Vec2::new(32.0, 32.0));
        assert_eq!(world.entities.len(), 2);
        assert_eq!(world.entities.mobs().next().unwrap().pos, Vec2::new(116.0, 116.0));

        let (_, apple) = world.entities.items().next().unwrap();
        assert_eq!(apple.kind, names::APPLE);
        assert_eq!(apple.pos, Vec2::new(208.0, 48.0));
        assert!(apple.pickable);
    }

    #[test]
    fn unknown_object_names_are_skipped() {
        let json = r#"{
            "tile_size": 32,
            "width": 320,
            "height": 320,
            "objects": [
                { "name": "player", "x": 0, "y": 0, "width": 32, "height": 32 },
                { "name": "trigger", "x": 64, "y": 64, "width": 32, "height": 32 },
                { "name": "spawn_marker", "x": 96, "y": 96, "width": 32, "height": 32 },
                { "name": "goal", "x": 128, "y": 128, "width": 32, "height": 32 }
            ]
        }"#;
        let data = ObjectMap::from_json(json).unwrap().load().unwrap();
        let (world, _) = World::from_map(&data, &SimConfig::default()).unwrap();

        let kinds: Vec<_> = world
            .entities
            .items()
            .map(|(_, item)| item.kind.clone())
            .collect();
        assert_eq!(kinds, vec![names::GOAL.to_string()]);
        assert_eq!(world.entities.len(), 1);
    }

    #[test]
    fn arena_ids_are_never_reused() {
        let geometry = MapGeometry::new(32.0, 320.0, 320.0);
        let mut world = World::new(geometry, Camera::new(960.0, 736.0, &geometry));
        let first = world.spawn_item("apple", Vec2::new(10.0, 10.0));
        let second = world.spawn_item("apple", Vec2::new(20.0, 20.0));

        assert!(world.entities.remove(first).is_some());
        assert!(world.entities.remove(first).is_none());
        assert!(world.entities.get(first).is_none());

        let third = world.spawn_item("pear", Vec2::new(30.0, 30.0));
        assert_ne!(third, first);
        assert!(world.entities.get(second).is_some());
        assert_eq!(world.entities.len(), 2);
    }

    // -----------------------------------------------------------------------
    // Camera
    // -----------------------------------------------------------------------

    fn camera(world: f32) -> Camera {
        Camera::new(960.0, 736.0, &MapGeometry::new(32.0, world, world))
    }

    #[test]
    fn camera_centres_on_target_in_open_world() {
        let mut cam = camera(2000.0);
        cam.follow(Vec2::new(1000.0, 1000.0));
        assert_eq!(cam.offset(), Vec2::new(480.0 - 1000.0, 368.0 - 1000.0));
        assert_eq!(
            cam.apply(Rect::new(1000.0, 1000.0, 32.0, 32.0)),
            Rect::new(480.0, 368.0, 32.0, 32.0)
        );
    }

    #[test]
    fn camera_clamps_at_world_edges() {
        let mut cam = camera(2000.0);
        cam.follow(Vec2::new(10.0, 10.0));
        assert_eq!(cam.offset(), Vec2::ZERO);
        assert_eq!(cam.viewport(), Rect::new(0.0, 0.0, 960.0, 736.0));

        cam.follow(Vec2::new(1990.0, 1990.0));
        assert_eq!(cam.offset(), Vec2::new(960.0 - 2000.0, 736.0 - 2000.0));
        assert_eq!(cam.viewport().right(), 2000.0);
        assert_eq!(cam.viewport().bottom(), 2000.0);
    }

    #[test]
    fn camera_stays_centred_in_small_world() {
        let mut cam = camera(320.0);
        cam.follow(Vec2::new(100.0, 200.0));
        assert_eq!(cam.offset(), Vec2::new(380.0, 168.0));

        cam.follow(Vec2::new(300.0, 20.0));
        assert_eq!(cam.offset(), Vec2::new(180.0, 348.0));
    }
}
