//! Whole-stream scenarios for the OBJ reader.

use std::io::Write;

use nalgebra::{Point2, Point3, Vector3};

use super::*;
use crate::error::{Attribute, MeshError};

fn read(text: &str) -> ObjDocument {
    ObjReader::default().read(text.as_bytes()).unwrap()
}

fn read_with(options: ObjOptions, text: &str) -> Result<ObjDocument> {
    ObjReader::new(options).read(text.as_bytes())
}

fn only_sub_mesh(document: &ObjDocument) -> &SubMesh {
    assert_eq!(document.groups.len(), 1);
    let subs = document.groups[0].sub_meshes();
    assert_eq!(subs.len(), 1);
    &subs[0]
}

const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 1 1 0\n";

#[test]
fn test_square_scenario() {
    let document = read(
        "v 0 0 0\nv 1 0 0\nv 1 1 0\nvt 0 0\nvt 1 0\nvt 1 1\ng square\nf 1/1 2/2 3/3\n",
    );
    assert_eq!(document.groups[0].name(), "square");

    let sub_mesh = only_sub_mesh(&document);
    assert!(sub_mesh.emits_texcoords());
    assert!(!sub_mesh.emits_normals());

    let mesh = sub_mesh.clone().into_mesh();
    assert_eq!(mesh.positions.len(), 3);
    assert_eq!(
        mesh.texcoords,
        Some(vec![
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
        ])
    );
    assert!(mesh.normals.is_none());
    assert_eq!(mesh.indices, vec![0, 1, 2]);
}

#[test]
fn test_shared_vertices_within_smoothing_group() {
    let document = read(&format!("{TRIANGLE}v 0 1 0\ns 1\nf 1 2 3\nf 1 3 4\n"));
    let mesh = only_sub_mesh(&document).clone().into_mesh();
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
}

#[test]
fn test_smoothing_off_never_shares() {
    let document = read(&format!("{TRIANGLE}v 0 1 0\ns off\nf 1 2 3\nf 1 3 4\n"));
    let mesh = only_sub_mesh(&document).clone().into_mesh();
    assert_eq!(mesh.vertex_count(), 6);
    assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn test_default_smoothing_can_be_disabled() {
    let text = format!("{TRIANGLE}f 1 2 3\nf 1 2 3\n");
    let shared = read(&text);
    assert_eq!(only_sub_mesh(&shared).builder().vertex_count(), 3);

    let options = ObjOptions::default().with_default_smoothing_on(false);
    let faceted = read_with(options, &text).unwrap();
    assert_eq!(only_sub_mesh(&faceted).builder().vertex_count(), 6);
}

#[test]
fn test_different_smoothing_groups_do_not_share() {
    let document = read(&format!("{TRIANGLE}s 1\nf 1 2 3\ns 2\nf 1 2 3\ns 1\nf 1 2 3\n"));
    let mesh = only_sub_mesh(&document).clone().into_mesh();
    assert_eq!(mesh.vertex_count(), 6);
    assert_eq!(&mesh.indices[6..], &[0, 1, 2]);
}

#[test]
fn test_negative_index_resolves_to_latest_position() {
    let document = read(&format!("{TRIANGLE}f -3 -2 -1\nv 5 5 5\nf -1 -2 -3\n"));
    let mesh = only_sub_mesh(&document).clone().into_mesh();
    assert_eq!(mesh.positions[2], Point3::new(1.0, 1.0, 0.0));
    assert_eq!(mesh.positions[3], Point3::new(5.0, 5.0, 5.0));
    // -2 and -3 in the second face are the already emitted positions 3 and 2.
    assert_eq!(&mesh.indices[3..], &[3, 2, 1]);
}

#[test]
fn test_group_boundary_resets_sharing() {
    let document = read(&format!("{TRIANGLE}g A\nf 1 2 3\ng B\nf 1 2 3\n"));
    assert_eq!(document.groups.len(), 2);
    for group in &document.groups {
        let mesh = group.sub_meshes()[0].clone().into_mesh();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }
    assert_eq!(document.group("B").unwrap().name(), "B");
}

#[test]
fn test_object_statement_starts_a_group() {
    let document = read(&format!("{TRIANGLE}o body\nf 1 2 3\n"));
    assert_eq!(document.groups[0].name(), "body");
}

#[test]
fn test_implicit_default_group() {
    let document = read(&format!("{TRIANGLE}f 1 2 3\n"));
    assert_eq!(document.groups[0].name(), "default");
}

#[test]
fn test_material_switch_splits_sub_meshes() {
    let document = read(&format!("{TRIANGLE}g a\nusemtl X\nf 1 2 3\nusemtl Y\nf 1 2 3\n"));
    let subs = document.groups[0].sub_meshes();
    assert_eq!(subs.len(), 2);
    assert_eq!(subs[0].material(), Some("X"));
    assert_eq!(subs[1].material(), Some("Y"));
    // The smoothing map was reset, so the second sub-mesh has its own vertices.
    assert_eq!(subs[1].builder().vertex_count(), 3);
}

#[test]
fn test_material_switch_without_geometry_keeps_one_sub_mesh() {
    let document = read(&format!("{TRIANGLE}g a\nusemtl X\nusemtl Y\nf 1 2 3\n"));
    let subs = document.groups[0].sub_meshes();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].material(), Some("Y"));
}

#[test]
fn test_attribute_presence_is_latched_by_first_face() {
    let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\nf 1/1/1 2/1/1 3/1/1\n";
    let document = read(text);
    let sub_mesh = only_sub_mesh(&document);
    assert!(sub_mesh.emits_normals());
    assert!(!sub_mesh.emits_texcoords());

    let mesh = sub_mesh.clone().into_mesh();
    assert!(mesh.texcoords.is_none());
    assert_eq!(mesh.normals.as_ref().map(Vec::len), Some(mesh.vertex_count()));
    // Texture indices of the second face are ignored, so it shares all three vertices.
    assert_eq!(mesh.vertex_count(), 3);
}

#[test]
fn test_missing_attribute_after_latch_is_recoverable() {
    let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\nf 1 2 3\n";
    let err = read_with(ObjOptions::default(), text).unwrap_err();
    assert!(matches!(err, MeshError::Format { line: 6, .. }));

    let document = read_with(ObjOptions::default().with_ignore_errors(true), text).unwrap();
    assert_eq!(only_sub_mesh(&document).builder().triangle_count(), 1);
}

#[test]
fn test_out_of_range_index_is_fatal_by_default() {
    let err = read_with(ObjOptions::default(), &format!("{TRIANGLE}f 1 2 4\n")).unwrap_err();
    match err {
        MeshError::IndexOutOfRange {
            line,
            attribute,
            index,
        } => {
            assert_eq!(line, 4);
            assert_eq!(attribute, Attribute::Position);
            assert_eq!(index, 4);
        }
        other => panic!("unexpected error {other:?}"),
    }

    let err = read_with(ObjOptions::default(), &format!("{TRIANGLE}vt 0 0\nf 1/1 2/2 3/1\n"))
        .unwrap_err();
    assert!(matches!(
        err,
        MeshError::IndexOutOfRange {
            attribute: Attribute::TexCoord,
            index: 2,
            ..
        }
    ));
}

#[test]
fn test_ignore_errors_drops_whole_face_and_continues() {
    let options = ObjOptions::default().with_ignore_errors(true);
    let text = format!("{TRIANGLE}v 0 1 0\nf 1 2 9\nf 1 2 3\ns bogus\nf 1 3 4\n");
    let document = read_with(options, &text).unwrap();

    let mesh = only_sub_mesh(&document).clone().into_mesh();
    assert_eq!(mesh.triangle_count(), 2);
    // The dropped face did not allocate any vertex.
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
}

#[test]
fn test_dropped_first_face_does_not_latch() {
    let options = ObjOptions::default().with_ignore_errors(true);
    let text = format!("{TRIANGLE}vt 0 0\nf 1 2 7\nf 1/1 2/1 3/1\n");
    let document = read_with(options, &text).unwrap();
    assert!(only_sub_mesh(&document).emits_texcoords());
}

#[test]
fn test_numeric_errors_are_fatal_even_when_ignoring_errors() {
    let options = ObjOptions::default().with_ignore_errors(true);
    let err = read_with(options.clone(), "v 1 2 x\n").unwrap_err();
    assert!(matches!(err, MeshError::Number { line: 1, .. }));

    let err = read_with(options, &format!("{TRIANGLE}f 1 2 three\n")).unwrap_err();
    assert_eq!(err.line(), Some(4));
}

#[test]
fn test_malformed_smoothing_group() {
    let err = read_with(ObjOptions::default(), "s smooth\n").unwrap_err();
    assert!(matches!(err, MeshError::Format { line: 1, .. }));
}

#[test]
fn test_face_with_two_corners() {
    let err = read_with(ObjOptions::default(), &format!("{TRIANGLE}f 1 2\n")).unwrap_err();
    assert!(err.is_recoverable());
}

#[test]
fn test_switch_yz() {
    let options = ObjOptions::default().with_switch_yz(true);
    let text = "v 1 2 3\nv 0 0 0\nv 1 0 0\nvn 0 1 0\nf 1//1 2//1 3//1\n";
    let document = read_with(options, text).unwrap();
    let mesh = only_sub_mesh(&document).clone().into_mesh();
    assert_eq!(mesh.positions[0], Point3::new(1.0, -3.0, 2.0));
    assert_eq!(mesh.normals.unwrap()[0], Vector3::new(0.0, 0.0, 1.0));
}

#[test]
fn test_pentagon_is_cut_into_ears() {
    // Corner 4 is reflex: a fan from corner 1 would flip the second triangle.
    let text = "v 0 0 0\nv 4 0 0\nv 4 4 0\nv 2 1 0\nv 0 4 0\nf 1 2 3 4 5\n";
    let mesh = only_sub_mesh(&read(text)).clone().into_mesh();
    assert_eq!(mesh.triangle_count(), 3);
    assert_ne!(mesh.indices, vec![0, 1, 2, 0, 2, 3, 0, 3, 4]);
    for triangle in mesh.triangles() {
        assert!(mesh.face_normal(triangle).z > 0.0);
    }
}

#[test]
fn test_quad_is_added_directly() {
    let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
    let mesh = only_sub_mesh(&read(text)).clone().into_mesh();
    assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
}

#[test]
fn test_ignored_and_unknown_statements() {
    let text = format!(
        "{TRIANGLE}vp 0.5\ncstype bspline\ndeg 3\nl 1 2\nmg 1 0.5\nfrobnicate 7\nf 1 2 3\n"
    );
    let document = read(&text);
    assert_eq!(only_sub_mesh(&document).builder().triangle_count(), 1);
}

#[test]
fn test_continuation_lines() {
    let document = read(&format!("{TRIANGLE}f 1 \\\n 2 \\\n\n 3\n"));
    assert_eq!(only_sub_mesh(&document).builder().triangle_count(), 1);
}

#[test]
fn test_texcoord_with_single_component() {
    let document = read("v 0 0 0\nv 1 0 0\nv 1 1 0\nvt 0.25\nf 1/1 2/1 3/1\n");
    let mesh = only_sub_mesh(&document).clone().into_mesh();
    assert_eq!(mesh.texcoords.unwrap()[0], Point2::new(0.25, 1.0));
}

#[test]
fn test_mtllib_is_loaded_relative_to_file() {
    let dir = std::env::temp_dir().join("meshkit-obj-mtllib");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("scene.mtl"), "newmtl red\nKd 1 0 0\n").unwrap();
    std::fs::write(
        dir.join("scene.obj"),
        format!("mtllib scene.mtl absent.mtl\n{TRIANGLE}usemtl red\nf 1 2 3\n"),
    )
    .unwrap();

    let options = ObjOptions::default();
    let reader = ObjReader::new(options.clone());
    let document = reader.read_path(&dir.join("scene.obj")).unwrap();
    assert_eq!(document.materials.len(), 1);
    assert_eq!(document.texture_path, dir);

    let model = document.into_model(&crate::CurrentThread, &options);
    assert_eq!(model.nodes.len(), 1);
    assert_eq!(model.nodes[0].material.name, "red");
}

#[test]
fn test_gzip_file_is_read_transparently() {
    use flate2::{write::GzEncoder, Compression};

    let dir = std::env::temp_dir().join("meshkit-obj-gzip");
    std::fs::create_dir_all(&dir).unwrap();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(format!("{TRIANGLE}f 1 2 3\n").as_bytes())
        .unwrap();
    let data = encoder.finish().unwrap();
    std::fs::write(dir.join("tri.obj.gz"), &data).unwrap();

    let reader = ObjReader::default();
    let document = reader.read_path(&dir.join("tri.obj.gz")).unwrap();
    assert_eq!(only_sub_mesh(&document).builder().triangle_count(), 1);

    let document = reader.read_gz(data.as_slice()).unwrap();
    assert_eq!(only_sub_mesh(&document).builder().triangle_count(), 1);
}

#[test]
fn test_unsupported_compression_is_rejected_before_parsing() {
    let err = ObjReader::default()
        .read_gz(&b"BZh91AY&SY"[..])
        .unwrap_err();
    assert!(matches!(err, MeshError::UnsupportedFormat(_)));
}

#[test]
fn test_parses_are_independent_across_threads() {
    let reader = ObjReader::default();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|k| {
                let reader = &reader;
                scope.spawn(move || {
                    let text = format!("{TRIANGLE}g t{k}\nf 1 2 3\n");
                    reader.read(text.as_bytes()).unwrap()
                })
            })
            .collect();
        for (k, handle) in handles.into_iter().enumerate() {
            let document = handle.join().unwrap();
            assert_eq!(document.groups[0].name(), format!("t{k}"));
        }
    });
}
