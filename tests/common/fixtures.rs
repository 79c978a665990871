use serde_json::{json, Value};

use eye_strain_monitor::monitor::ear::{LEFT_EYE, RIGHT_EYE};

pub const FACE_MESH_POINTS: usize = 478;

/// Face-mesh landmark list where both eyes have the requested aspect ratio.
pub fn landmarks_with_ear(ear: f64) -> Vec<Value> {
    let mut points = vec![(0.5, 0.5); FACE_MESH_POINTS];
    place_eye(&mut points, &LEFT_EYE, 0.30, ear);
    place_eye(&mut points, &RIGHT_EYE, 0.60, ear);
    points
        .into_iter()
        .map(|(x, y)| json!({ "x": x, "y": y, "z": 0.0 }))
        .collect()
}

pub fn frame_body(ear: f64) -> Value {
    json!({ "landmarks": landmarks_with_ear(ear) })
}

pub fn no_face_body() -> Value {
    json!({ "landmarks": null })
}

fn place_eye(points: &mut [(f64, f64)], eye: &[usize; 6], left_x: f64, ear: f64) {
    let width = 0.1;
    let half_gap = ear * width / 2.0;
    let y = 0.4;
    let [p1, p2, p3, p4, p5, p6] = *eye;
    points[p1] = (left_x, y);
    points[p4] = (left_x + width, y);
    points[p2] = (left_x + 0.03, y - half_gap);
    points[p6] = (left_x + 0.03, y + half_gap);
    points[p3] = (left_x + 0.07, y - half_gap);
    points[p5] = (left_x + 0.07, y + half_gap);
}
