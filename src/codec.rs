// Line-oriented text form of a graph:
//
//   points
//   <id>,<x>,<y>
//   edges
//   <id>,<p1>,<p2>
//
// The decoder is permissive: blank lines, unparseable rows and edges that
// reference unknown points are dropped.

use std::collections::HashMap;
use std::fmt::Write;

use crate::model::{PointId, Vec2};
use crate::Graph;

#[derive(Clone, Copy, PartialEq)]
enum Section {
    None,
    Points,
    Edges,
}

pub fn encode_impl(g: &Graph) -> String {
    let mut out = String::from("points\n");
    for (id, p) in g.points() {
        let _ = writeln!(out, "{},{},{}", id, p.x, p.y);
    }
    out.push_str("edges\n");
    for e in g.edges() {
        let _ = writeln!(out, "{},{},{}", e, e.a(), e.b());
    }
    out
}

fn parse_point_row(line: &str) -> Option<(PointId, Vec2)> {
    let mut parts = line.split(',');
    let id = parts.next()?.trim();
    let x: f64 = parts.next()?.trim().parse().ok()?;
    let y: f64 = parts.next()?.trim().parse().ok()?;
    if id.is_empty() || parts.next().is_some() || !x.is_finite() || !y.is_finite() {
        return None;
    }
    Some((PointId::new(id), Vec2::new(x, y)))
}

fn parse_edge_row(line: &str) -> Option<(PointId, PointId)> {
    let mut parts = line.split(',');
    let _id = parts.next()?;
    let a = parts.next()?.trim();
    let b = parts.next()?.trim();
    if a.is_empty() || b.is_empty() || parts.next().is_some() {
        return None;
    }
    Some((PointId::new(a), PointId::new(b)))
}

pub fn decode_impl(text: &str) -> Graph {
    let mut g = Graph::new();
    // A row whose id is already taken gets a fresh one; edges name the first.
    let mut remap: HashMap<PointId, PointId> = HashMap::new();
    let mut section = Section::None;
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match line {
            "points" => {
                section = Section::Points;
                continue;
            }
            "edges" => {
                section = Section::Edges;
                continue;
            }
            _ => {}
        }
        match section {
            Section::Points => {
                if let Some((id, pos)) = parse_point_row(line) {
                    if !remap.contains_key(&id) {
                        g.bump();
                        let got = g.insert_point(pos, Some(id.clone()));
                        remap.insert(id, got);
                    }
                }
            }
            Section::Edges => {
                if let Some((a, b)) = parse_edge_row(line) {
                    if let (Some(a), Some(b)) = (remap.get(&a), remap.get(&b)) {
                        let (a, b) = (a.clone(), b.clone());
                        g.add_edge(&a, &b);
                    }
                }
            }
            Section::None => {}
        }
    }
    g
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_points_and_edges() {
        let mut g = Graph::new();
        let a = g.add_point(Vec2::new(-50.0, -50.0), Some(PointId::from("a")));
        let b = g.add_point(Vec2::new(0.1 + 0.2, 1.0 / 3.0), None);
        let c = g.add_point(Vec2::new(1e-7, 12345.678), None);
        g.add_edge(&a, &b);
        g.add_edge(&b, &c);
        let text = g.encode();
        let h = Graph::decode(&text);
        assert_eq!(h.points(), g.points());
        assert_eq!(h.edges(), g.edges());
        assert_eq!(h.encode(), text);
    }

    #[test]
    fn coincident_points_survive_round_trip() {
        let mut g = Graph::new();
        let a = g.add_point(Vec2::new(0.0, 0.0), None);
        let b = g.add_point(Vec2::new(4.0, 0.0), None);
        let c = g.add_point(Vec2::new(0.0, 3.0), None);
        g.add_edge(&a, &b);
        g.add_edge(&b, &c);
        g.add_edge(&c, &a);
        g.set_point(&b, g.point(&a));
        let back = Graph::decode(&g.encode());
        assert_eq!(back.points().len(), 3);
        assert_eq!(back.edges().len(), 3);
        assert_eq!(back.points(), g.points());
        assert_eq!(back.edges(), g.edges());
    }

    #[test]
    fn decoder_skips_garbage() {
        let text = "\
points
a,0,0
b,10,0
nonsense
c,x,1
c,0,10

edges
a-b,a,b
b-c,b,c
bad-row
a-zz,a,zz
b-c,c,a
";
        let g = Graph::decode(text);
        assert_eq!(g.points().len(), 3);
        assert_eq!(g.edges().len(), 3);
        assert!(g.contains_point(&PointId::from("c")));
    }

    #[test]
    fn decoded_counter_continues_after_numeric_ids() {
        let g = Graph::decode("points\n7,0,0\n3,1,1\nedges\n");
        let mut g = g;
        assert_eq!(g.add_point(Vec2::new(5.0, 5.0), None), PointId::from(8));
    }
}
