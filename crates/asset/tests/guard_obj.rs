use std::{fs, path::PathBuf};

use asset::obj::{ObjError, load_obj_by_material, parse_obj_report};

fn guard_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/guard.obj")
}

#[test]
fn bundled_guard_loads_every_part() {
    let groups = load_obj_by_material(guard_path()).expect("load guard.obj");

    let names: Vec<&str> = groups.names().collect();
    assert_eq!(
        names,
        vec!["Boots", "Helmet", "Skin", "Spear", "Trousers", "Tunic"]
    );
    // 13 boxes, 6 quads each, 2 triangles per quad.
    assert_eq!(groups.vertex_count(), 13 * 36);
    assert_eq!(groups.get("Tunic").map(<[_]>::len), Some(3 * 36));
    assert_eq!(groups.get("Helmet").map(<[_]>::len), Some(36));
}

#[test]
fn bundled_guard_is_clean() {
    let file = fs::File::open(guard_path()).expect("open guard.obj");
    let report = parse_obj_report(std::io::BufReader::new(file)).expect("parse guard.obj");
    assert!(report.skipped.is_empty(), "{:?}", report.skipped);
    assert_eq!(report.faces, 13 * 6);

    for (_, vertices) in report.groups.iter() {
        for v in vertices {
            let len2: f32 = v.normal.iter().map(|c| c * c).sum();
            assert!((len2 - 1.0).abs() < 1e-6);
            assert!(v.uv.iter().all(|c| (0.0..=1.0).contains(c)));
        }
    }
}

#[test]
fn file_with_bad_lines_still_yields_good_geometry() {
    let path = std::env::temp_dir().join(format!("nightguard-bad-{}.obj", std::process::id()));
    fs::write(
        &path,
        "v 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl Wood\nf 1 2 3\nf 1 x 3\nf 1 2\nf 1 2 7\nf 3 2 1\n",
    )
    .expect("write temp obj");

    let groups = load_obj_by_material(&path);
    let _ = fs::remove_file(&path);

    let groups = groups.expect("bad lines are not fatal");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups.get("Wood").map(<[_]>::len), Some(6));
}

#[test]
fn missing_file_is_never_an_empty_success() {
    let result = load_obj_by_material(guard_path().with_file_name("missing.obj"));
    match result {
        Err(ObjError::ResourceUnavailable { path, .. }) => {
            assert!(path.ends_with("missing.obj"));
        }
        other => panic!("expected ResourceUnavailable, got {other:?}"),
    }
}
