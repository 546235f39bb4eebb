use serde::Serialize;
use serde_json::Value;

use crate::{
    algorithms::regions::{describe_regions, Regions},
    model::{PointId, Vec2},
    Graph,
};

#[derive(Serialize)]
struct PointSer<'a> {
    id: &'a PointId,
    x: f64,
    y: f64,
}

#[derive(Serialize)]
struct EdgeSer<'a> {
    a: &'a PointId,
    b: &'a PointId,
}

#[derive(Serialize)]
struct RegionSer {
    id: String,
    points: Vec<PointId>,
    polygon: Vec<Vec2>,
    area: f64,
}

/// Read-only snapshot for renderers.
pub fn to_json_impl(g: &Graph) -> Value {
    let points: Vec<PointSer> = g
        .points()
        .iter()
        .map(|(id, p)| PointSer { id, x: p.x, y: p.y })
        .collect();
    let edges: Vec<EdgeSer> = g.edges().iter().map(|e| EdgeSer { a: e.a(), b: e.b() }).collect();
    serde_json::json!({
        "generation": g.generation(),
        "points": points,
        "edges": edges,
    })
}

pub fn regions_to_json(g: &Graph, regions: &Regions) -> Value {
    let out: Vec<RegionSer> = describe_regions(g, regions)
        .into_iter()
        .map(|r| RegionSer {
            id: r.id.to_string(),
            points: r.points,
            polygon: r.polygon,
            area: r.area,
        })
        .collect();
    serde_json::to_value(out).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_lists_points_and_edges() {
        let mut g = Graph::new();
        let a = g.add_point(Vec2::new(0.0, 0.0), None);
        let b = g.add_point(Vec2::new(1.0, 2.0), None);
        g.add_edge(&a, &b);
        let v = g.to_json();
        assert_eq!(v["points"].as_array().map(|a| a.len()), Some(2));
        assert_eq!(v["edges"][0]["a"], "0");
        assert_eq!(v["points"][1]["y"], 2.0);
    }
}
