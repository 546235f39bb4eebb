use approx::assert_relative_eq;
use roomcut::algorithms::planarize::planarize;
use roomcut::algorithms::regions::{brute_force, cross_check, describe_regions, face_trace, sorted_regions};
use roomcut::geometry::math::point_in_polygon;
use roomcut::{Graph, PointId, RegionStrategy, Vec2};

fn named(g: &mut Graph, name: &str, x: f64, y: f64) -> PointId {
    g.add_point(Vec2::new(x, y), Some(PointId::from(name)))
}

// a b c
// d   f
// g h i
fn tic_tac_scene() -> Graph {
    let mut g = Graph::new();
    let a = named(&mut g, "a", -50.0, -50.0);
    let b = named(&mut g, "b", 0.0, -50.0);
    let c = named(&mut g, "c", 50.0, -50.0);
    let d = named(&mut g, "d", -50.0, 0.0);
    let f = named(&mut g, "f", 50.0, 0.0);
    let gg = named(&mut g, "g", -50.0, 50.0);
    let h = named(&mut g, "h", 0.0, 50.0);
    let i = named(&mut g, "i", 50.0, 50.0);
    for (p, q) in [(&a, &b), (&b, &c), (&c, &f), (&f, &i), (&i, &h), (&h, &gg), (&gg, &d), (&d, &a), (&b, &h), (&d, &f)] {
        g.add_edge(p, q);
    }
    g
}

fn grid(n: usize, step: f64) -> Graph {
    let mut g = Graph::new();
    let mut ids = Vec::new();
    for j in 0..=n {
        for i in 0..=n {
            ids.push(g.add_point(Vec2::new(i as f64 * step, j as f64 * step), None));
        }
    }
    let ix = |i: usize, j: usize| ids[j * (n + 1) + i].clone();
    for j in 0..=n {
        for i in 0..n {
            g.add_edge(&ix(i, j), &ix(i + 1, j));
            g.add_edge(&ix(j, i), &ix(j, i + 1));
        }
    }
    g
}

fn fan() -> Graph {
    // hexagon with spokes to a hub
    let mut g = Graph::new();
    let hub = g.add_point(Vec2::new(0.0, 0.0), None);
    let rim: Vec<PointId> = (0..6)
        .map(|k| {
            let a = k as f64 * std::f64::consts::PI / 3.0;
            g.add_point(Vec2::new(10.0 * a.cos(), 10.0 * a.sin()), None)
        })
        .collect();
    for k in 0..6 {
        g.add_edge(&rim[k], &rim[(k + 1) % 6]);
        g.add_edge(&hub, &rim[k]);
    }
    g
}

fn l_shape_with_tail() -> Graph {
    let mut g = Graph::new();
    let pts: Vec<PointId> = [(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (2.0, 2.0), (2.0, 4.0), (0.0, 4.0), (6.0, 6.0)]
        .iter()
        .map(|&(x, y)| g.add_point(Vec2::new(x, y), None))
        .collect();
    for k in 0..6 {
        g.add_edge(&pts[k], &pts[(k + 1) % 6]);
    }
    g.add_edge(&pts[0], &pts[3]);
    g.add_edge(&pts[2], &pts[6]);
    g
}

#[test]
fn tic_tac_scene_has_four_equal_rooms() {
    let planar = planarize(&tic_tac_scene());
    assert_eq!(planar.points().len(), 9);
    assert_eq!(planar.edges().len(), 12);
    let regions = planar.regions(RegionStrategy::CrossCheck);
    assert_eq!(regions.len(), 4);
    for info in describe_regions(&planar, &regions) {
        assert_relative_eq!(info.area, 2500.0, epsilon = 1e-9);
        assert_eq!(info.points.len(), 4);
    }
    // reading order on a y-down canvas: a's room first, i's room last
    let sorted = sorted_regions(&planar, &regions);
    assert!(sorted[0].points.contains(&PointId::from("a")));
    assert!(sorted[1].points.contains(&PointId::from("c")));
    assert!(sorted[3].points.contains(&PointId::from("i")));
}

#[test]
fn strategies_agree_on_fixture_battery() {
    let battery = [
        ("tic-tac", planarize(&tic_tac_scene())),
        ("grid", grid(3, 5.0)),
        ("fan", fan()),
        ("l-shape", l_shape_with_tail()),
    ];
    for (name, g) in &battery {
        let bf = brute_force(g);
        let ft = face_trace(g);
        assert!(!ft.is_empty(), "{name}: no faces");
        assert_eq!(bf.keys().collect::<Vec<_>>(), ft.keys().collect::<Vec<_>>(), "{name}");
        assert!(cross_check(g).is_ok(), "{name}");
    }
}

#[test]
fn expected_face_counts() {
    assert_eq!(face_trace(&grid(3, 5.0)).len(), 9);
    assert_eq!(face_trace(&fan()).len(), 6);
    assert_eq!(face_trace(&l_shape_with_tail()).len(), 2);
}

#[test]
fn no_region_contains_another() {
    for g in [planarize(&tic_tac_scene()), grid(3, 1.0), fan()] {
        let infos = describe_regions(&g, &g.regions(RegionStrategy::FaceTrace));
        for outer in &infos {
            for inner in &infos {
                if outer.id == inner.id {
                    continue;
                }
                assert!(
                    !point_in_polygon(inner.centroid, &outer.polygon),
                    "{} inside {}",
                    inner.id,
                    outer.id
                );
            }
        }
    }
}

#[test]
fn face_areas_sum_to_the_outline() {
    let g = grid(4, 2.5);
    let total: f64 = describe_regions(&g, &face_trace(&g)).iter().map(|r| r.area).sum();
    assert_relative_eq!(total, 100.0, epsilon = 1e-9);
}

#[test]
fn region_json_lists_polygons() {
    let planar = planarize(&tic_tac_scene());
    let regions = planar.regions(RegionStrategy::FaceTrace);
    let v = planar.regions_to_json(&regions);
    let arr = v.as_array().expect("array");
    assert_eq!(arr.len(), 4);
    assert_eq!(arr[0]["polygon"].as_array().map(|p| p.len()), Some(4));
    assert_eq!(arr[0]["area"], 2500.0);
}
