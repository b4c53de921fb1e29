//! OBJ loader that buckets triangles by `usemtl` material.
//!
//! Understands `v`, `vt`, `vn`, `usemtl` and `f`; every other directive is
//! ignored. Only failing to open or read the source is fatal. Malformed faces
//! and out-of-range references are skipped and reported in [`ObjReport`], so
//! one bad line never costs the rest of the asset.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    num::IntErrorKind,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::mesh::{DEFAULT_NORMAL, DEFAULT_UV, MaterialGroups, MeshVertex};

/// Material that collects faces seen before any `usemtl`.
pub const DEFAULT_MATERIAL: &str = "default";

/// Fatal loader errors.
#[derive(Debug, Error)]
pub enum ObjError {
    #[error("failed to open OBJ file {}: {source}", .path.display())]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read OBJ line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: io::Error,
    },
}

/// Why a face, vertex or attribute line was skipped or patched.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SkipReason {
    #[error("malformed face token '{0}'")]
    MalformedToken(String),
    #[error("degenerate face with {0} vertex reference(s)")]
    DegenerateFace(usize),
    #[error("position index {index} does not resolve against {len} position(s)")]
    IndexOutOfRange { index: i64, len: usize },
    #[error("malformed '{0}' line, missing components read as 0")]
    MalformedAttribute(&'static str),
}

/// A non-fatal problem found at `line` (1-based).
#[derive(Clone, Debug, PartialEq)]
pub struct Skipped {
    pub line: usize,
    pub reason: SkipReason,
}

/// Result of a parse: the material groups plus everything that was skipped.
#[derive(Clone, Debug, Default)]
pub struct ObjReport {
    pub groups: MaterialGroups,
    pub skipped: Vec<Skipped>,
    /// Number of `f` lines that produced at least a candidate polygon.
    pub faces: usize,
}

/// Load an OBJ file and group its triangles by material.
pub fn load_obj_by_material(path: impl AsRef<Path>) -> Result<MaterialGroups, ObjError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ObjError::ResourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    let report = parse_obj_report(BufReader::new(file))?;

    log::info!(
        "Loaded OBJ {:?}: {} face(s), {} material group(s), {} vertices",
        path,
        report.faces,
        report.groups.len(),
        report.groups.vertex_count()
    );
    if !report.skipped.is_empty() {
        log::warn!(
            "OBJ {:?}: skipped {} malformed element(s)",
            path,
            report.skipped.len()
        );
    }

    Ok(report.groups)
}

/// Load material groups from any [`BufRead`] source.
pub fn load_obj_by_material_from_reader<R: BufRead>(
    reader: R,
) -> Result<MaterialGroups, ObjError> {
    parse_obj_report(reader).map(|report| report.groups)
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_by_material_from_str(contents: &str) -> MaterialGroups {
    report_from_str(contents).groups
}

/// Parse from a reader, keeping the list of skipped elements.
///
/// Lines are decoded lossily, so stray non-UTF-8 bytes only affect the line
/// they appear on.
pub fn parse_obj_report<R: BufRead>(mut reader: R) -> Result<ObjReport, ObjError> {
    let mut parser = Parser::default();
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| ObjError::Read {
                line: line_no + 1,
                source,
            })?;
        if read == 0 {
            break;
        }
        line_no += 1;
        parser.feed(line_no, &String::from_utf8_lossy(&buf));
    }

    Ok(parser.finish())
}

/// Parse an in-memory OBJ, keeping the list of skipped elements.
pub fn report_from_str(contents: &str) -> ObjReport {
    let mut parser = Parser::default();
    for (idx, line) in contents.lines().enumerate() {
        parser.feed(idx + 1, line);
    }
    parser.finish()
}

/// Resolve a raw OBJ index against a pool holding `len` elements.
///
/// Positive indices are 1-based, negative ones count back from the end of the
/// pool as it stands now, and 0 never refers to anything.
pub fn resolve_index(raw: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let idx = match raw {
        0 => return None,
        r if r > 0 => r - 1,
        r => len + r,
    };
    if (0..len).contains(&idx) {
        usize::try_from(idx).ok()
    } else {
        None
    }
}

/// One `v[/t[/n]]` reference from an `f` line, still unresolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FaceRef {
    position: i64,
    texcoord: Option<i64>,
    normal: Option<i64>,
}

impl FaceRef {
    /// `None` if the token is malformed.
    fn parse(token: &str) -> Option<Self> {
        let mut slots = token.split('/');
        let position = parse_index(slots.next()?)?;
        let texcoord = parse_optional_slot(slots.next())?;
        let normal = parse_optional_slot(slots.next())?;
        if slots.next().is_some() {
            return None;
        }
        Some(Self {
            position,
            texcoord,
            normal,
        })
    }
}

/// Missing and empty slots are "unspecified"; anything else must be an integer.
fn parse_optional_slot(slot: Option<&str>) -> Option<Option<i64>> {
    match slot {
        None | Some("") => Some(None),
        Some(value) => parse_index(value).map(Some),
    }
}

/// Integers too large for `i64` saturate, which is out of range for any pool.
fn parse_index(value: &str) -> Option<i64> {
    match value.parse::<i64>() {
        Ok(idx) => Some(idx),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

fn parse_components<'a, const N: usize>(
    mut parts: impl Iterator<Item = &'a str>,
) -> ([f32; N], bool) {
    let mut out = [0.0; N];
    let mut complete = true;
    for slot in out.iter_mut() {
        match parts.next().map(str::parse::<f32>) {
            Some(Ok(value)) => *slot = value,
            _ => complete = false,
        }
    }
    (out, complete)
}

#[derive(Debug)]
struct Parser {
    positions: Vec<[f32; 3]>,
    texcoords: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
    material: String,
    report: ObjReport,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            positions: Vec::new(),
            texcoords: Vec::new(),
            normals: Vec::new(),
            material: DEFAULT_MATERIAL.to_owned(),
            report: ObjReport::default(),
        }
    }
}

impl Parser {
    fn feed(&mut self, line: usize, text: &str) {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return;
        }

        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            return;
        };

        match tag {
            "v" => {
                let (position, complete): ([f32; 3], bool) = parse_components(parts);
                if !complete {
                    self.skip(line, SkipReason::MalformedAttribute("v"));
                }
                self.positions.push(position);
            }
            "vt" => {
                let ([u, v], complete): ([f32; 2], bool) = parse_components(parts);
                if !complete {
                    self.skip(line, SkipReason::MalformedAttribute("vt"));
                }
                self.texcoords.push([u, 1.0 - v]);
            }
            "vn" => {
                let (normal, complete): ([f32; 3], bool) = parse_components(parts);
                if !complete {
                    self.skip(line, SkipReason::MalformedAttribute("vn"));
                }
                self.normals.push(normal);
            }
            "usemtl" => {
                self.material = parts.next().unwrap_or(DEFAULT_MATERIAL).to_owned();
            }
            "f" => self.face(line, parts),
            _ => {}
        }
    }

    fn face<'a>(&mut self, line: usize, tokens: impl Iterator<Item = &'a str>) {
        let mut refs = Vec::with_capacity(4);
        for token in tokens {
            match FaceRef::parse(token) {
                Some(face_ref) => refs.push(face_ref),
                None => {
                    return self.skip(line, SkipReason::MalformedToken(token.to_owned()));
                }
            }
        }
        if refs.len() < 3 {
            return self.skip(line, SkipReason::DegenerateFace(refs.len()));
        }
        self.report.faces += 1;

        let corners: Vec<Option<MeshVertex>> =
            refs.iter().map(|face_ref| self.assemble(line, face_ref)).collect();

        // Fan: (0,1,2), (0,2,3), ... A dropped corner drops every triangle using it.
        for i in 1..corners.len() - 1 {
            if let (Some(a), Some(b), Some(c)) = (corners[0], corners[i], corners[i + 1]) {
                self.report.groups.push_triangle(&self.material, [a, b, c]);
            }
        }
    }

    fn assemble(&mut self, line: usize, face_ref: &FaceRef) -> Option<MeshVertex> {
        let Some(position) = resolve_index(face_ref.position, self.positions.len())
            .map(|idx| self.positions[idx])
        else {
            self.skip(
                line,
                SkipReason::IndexOutOfRange {
                    index: face_ref.position,
                    len: self.positions.len(),
                },
            );
            return None;
        };

        let uv = face_ref
            .texcoord
            .and_then(|raw| resolve_index(raw, self.texcoords.len()))
            .map_or(DEFAULT_UV, |idx| self.texcoords[idx]);
        let normal = face_ref
            .normal
            .and_then(|raw| resolve_index(raw, self.normals.len()))
            .map_or(DEFAULT_NORMAL, |idx| self.normals[idx]);

        Some(MeshVertex::new(position, normal, uv))
    }

    fn skip(&mut self, line: usize, reason: SkipReason) {
        log::debug!("OBJ line {}: {}", line, reason);
        self.report.skipped.push(Skipped { line, reason });
    }

    fn finish(mut self) -> ObjReport {
        self.report.groups.drop_empty();
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE_POOL: &str = "
        v 0.0 0.0 0.0
        v 1.0 0.0 0.0
        v 0.0 1.0 0.0
    ";

    fn reasons(report: &ObjReport) -> Vec<SkipReason> {
        report.skipped.iter().map(|s| s.reason.clone()).collect()
    }

    #[test]
    fn resolves_positive_negative_and_zero() {
        assert_eq!(resolve_index(1, 3), Some(0));
        assert_eq!(resolve_index(3, 3), Some(2));
        assert_eq!(resolve_index(-1, 3), Some(2));
        assert_eq!(resolve_index(-3, 3), Some(0));
        assert_eq!(resolve_index(0, 3), None);
        assert_eq!(resolve_index(4, 3), None);
        assert_eq!(resolve_index(-4, 3), None);
        assert_eq!(resolve_index(1, 0), None);
    }

    #[test]
    fn attribute_values_flow_into_face_vertices() {
        let src = "
            v 1.5 -2.0 3.25
            v 4.0 5.0 6.0
            v 7.0 8.0 9.0
            vt 0.25 0.75
            vt 1.0 0.0
            vn 0.0 0.0 1.0
            f 1/1/1 2/2/1 3/1/1
        ";
        let groups = load_obj_by_material_from_str(src);
        let verts = groups.get(DEFAULT_MATERIAL).expect("default group");
        assert_eq!(verts.len(), 3);
        assert_eq!(verts[0].position, [1.5, -2.0, 3.25]);
        assert_eq!(verts[1].position, [4.0, 5.0, 6.0]);
        assert_eq!(verts[2].position, [7.0, 8.0, 9.0]);
        // V is flipped on parse.
        assert_eq!(verts[0].uv, [0.25, 0.25]);
        assert_eq!(verts[1].uv, [1.0, 1.0]);
        assert!(verts.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
    }

    #[test]
    fn last_element_by_count_and_by_minus_one() {
        let src = "
            v 0 0 0
            v 1 0 0
            v 0 1 0
            v 9 9 9
            f 4 1 2
            f -1 1 2
        ";
        let groups = load_obj_by_material_from_str(src);
        let verts = groups.get(DEFAULT_MATERIAL).expect("default group");
        assert_eq!(verts.len(), 6);
        assert_eq!(verts[0].position, [9.0, 9.0, 9.0]);
        assert_eq!(verts[3].position, [9.0, 9.0, 9.0]);
    }

    #[test]
    fn relative_indices_use_pool_size_at_the_face_line() {
        let src = "
            v 0 0 0
            v 1 0 0
            v 0 1 0
            f -3 -2 -1
            v 5 5 5
            v 6 6 6
            v 7 7 7
            f -3 -2 -1
        ";
        let groups = load_obj_by_material_from_str(src);
        let verts = groups.get(DEFAULT_MATERIAL).expect("default group");
        assert_eq!(verts.len(), 6);
        assert_eq!(verts[0].position, [0.0, 0.0, 0.0]);
        assert_eq!(verts[2].position, [0.0, 1.0, 0.0]);
        assert_eq!(verts[3].position, [5.0, 5.0, 5.0]);
        assert_eq!(verts[5].position, [7.0, 7.0, 7.0]);
    }

    #[test]
    fn bare_triangle_gets_default_attributes() {
        let src = format!("{TRIANGLE_POOL}\nf 1 2 3\n");
        let groups = load_obj_by_material_from_str(&src);
        assert_eq!(groups.len(), 1);
        let verts = groups.get(DEFAULT_MATERIAL).expect("default group");
        assert_eq!(verts.len(), 3);
        for v in verts {
            assert_eq!(v.uv, [0.0, 0.0]);
            assert_eq!(v.normal, [0.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn quad_becomes_two_triangles() {
        let src = "
            v 0 0 0
            v 1 0 0
            v 1 1 0
            v 0 1 0
            f 1 2 3 4
        ";
        let groups = load_obj_by_material_from_str(src);
        let verts = groups.get(DEFAULT_MATERIAL).expect("default group");
        let positions: Vec<[f32; 3]> = verts.iter().map(|v| v.position).collect();
        assert_eq!(
            positions,
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ]
        );
    }

    #[test]
    fn zero_texcoord_and_empty_slots_fall_back_to_defaults() {
        let src = format!(
            "{TRIANGLE_POOL}
            vt 0.5 0.25
            vn 1 0 0
            f 1/1/1 2/0/ 3//
            "
        );
        let report = report_from_str(&src);
        assert!(report.skipped.is_empty());
        let verts = report.groups.get(DEFAULT_MATERIAL).expect("default group");
        assert_eq!(verts[0].uv, [0.5, 0.75]);
        assert_eq!(verts[0].normal, [1.0, 0.0, 0.0]);
        assert_eq!(verts[1].uv, [0.0, 0.0]);
        assert_eq!(verts[1].normal, [0.0, 1.0, 0.0]);
        assert_eq!(verts[2].uv, [0.0, 0.0]);
        assert_eq!(verts[2].normal, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn normal_only_token_keeps_normal() {
        let src = format!("{TRIANGLE_POOL}\nvn 0 0 -1\nf 1//1 2//1 3//1\n");
        let groups = load_obj_by_material_from_str(&src);
        let verts = groups.get(DEFAULT_MATERIAL).expect("default group");
        assert!(verts.iter().all(|v| v.normal == [0.0, 0.0, -1.0]));
        assert!(verts.iter().all(|v| v.uv == [0.0, 0.0]));
    }

    #[test]
    fn faces_are_grouped_by_material() {
        let src = format!(
            "{TRIANGLE_POOL}
            usemtl Wood
            f 1 2 3
            f 3 2 1
            usemtl Stone
            f 1 2 3
            "
        );
        let groups = load_obj_by_material_from_str(&src);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups.get("Wood").map(<[_]>::len), Some(6));
        assert_eq!(groups.get("Stone").map(<[_]>::len), Some(3));
        assert!(groups.get(DEFAULT_MATERIAL).is_none());
    }

    #[test]
    fn revisited_material_appends_to_its_group() {
        let src = format!(
            "{TRIANGLE_POOL}
            usemtl Wood
            f 1 2 3
            usemtl Stone
            f 1 2 3
            usemtl Wood
            f 1 2 3
            "
        );
        let groups = load_obj_by_material_from_str(&src);
        assert_eq!(groups.get("Wood").map(<[_]>::len), Some(6));
        assert_eq!(groups.get("Stone").map(<[_]>::len), Some(3));
    }

    #[test]
    fn usemtl_without_name_selects_default() {
        let src = format!(
            "{TRIANGLE_POOL}
            usemtl Wood
            f 1 2 3
            usemtl
            f 1 2 3
            "
        );
        let groups = load_obj_by_material_from_str(&src);
        assert_eq!(groups.get("Wood").map(<[_]>::len), Some(3));
        assert_eq!(groups.get(DEFAULT_MATERIAL).map(<[_]>::len), Some(3));
    }

    #[test]
    fn malformed_token_skips_only_that_face() {
        let src = format!("{TRIANGLE_POOL}\nf a/1/1 2 3\nf 1 2 3\n");
        let report = report_from_str(&src);
        assert_eq!(report.groups.vertex_count(), 3);
        assert_eq!(
            report.skipped,
            vec![Skipped {
                line: 6,
                reason: SkipReason::MalformedToken("a/1/1".into()),
            }]
        );
    }

    #[test]
    fn non_numeric_optional_slot_rejects_face() {
        let src = format!("{TRIANGLE_POOL}\nf 1/x 2 3\nf 1/2/3/4 2 3\n");
        let report = report_from_str(&src);
        assert!(report.groups.is_empty());
        assert_eq!(report.skipped.len(), 2);
    }

    #[test]
    fn degenerate_faces_are_skipped() {
        let src = format!("{TRIANGLE_POOL}\nf 1 2\nf\nf 1 2 3\n");
        let report = report_from_str(&src);
        assert_eq!(report.groups.vertex_count(), 3);
        assert_eq!(
            reasons(&report),
            vec![SkipReason::DegenerateFace(2), SkipReason::DegenerateFace(0)]
        );
    }

    #[test]
    fn out_of_range_vertex_drops_its_triangles_only() {
        let src = "
            v 0 0 0
            v 1 0 0
            v 1 1 0
            f 1 2 3 9
            f 0 1 2
        ";
        let report = report_from_str(src);
        // First triangle of the quad survives, the one using vertex 9 does not.
        assert_eq!(report.groups.vertex_count(), 3);
        assert_eq!(
            reasons(&report),
            vec![
                SkipReason::IndexOutOfRange { index: 9, len: 3 },
                SkipReason::IndexOutOfRange { index: 0, len: 3 },
            ]
        );
    }

    #[test]
    fn face_referencing_later_positions_is_dropped() {
        let src = "
            v 0 0 0
            f 1 2 3
            v 1 0 0
            v 0 1 0
        ";
        let report = report_from_str(src);
        assert!(report.groups.is_empty());
        assert_eq!(report.skipped.len(), 2);
    }

    #[test]
    fn pentagon_is_fan_triangulated() {
        let src = "
            v 0 0 0
            v 1 0 0
            v 2 1 0
            v 1 2 0
            v 0 1 0
            f 1 2 3 4 5
        ";
        let groups = load_obj_by_material_from_str(src);
        assert_eq!(groups.vertex_count(), 9);
    }

    #[test]
    fn malformed_attribute_line_keeps_indices_aligned() {
        let src = "
            v 0 0 0
            v oops
            v 0 1 0
            f 1 2 3
        ";
        let report = report_from_str(src);
        let verts = report.groups.get(DEFAULT_MATERIAL).expect("default group");
        assert_eq!(verts[1].position, [0.0, 0.0, 0.0]);
        assert_eq!(verts[2].position, [0.0, 1.0, 0.0]);
        assert_eq!(reasons(&report), vec![SkipReason::MalformedAttribute("v")]);
    }

    #[test]
    fn comments_and_unknown_directives_are_ignored() {
        let src = format!(
            "# header
            mtllib guard.mtl
            o Guard
            g body
            s 1
            {TRIANGLE_POOL}
            f 1 2 3 # inline comments are not stripped
            f 1 2 3
            "
        );
        let report = report_from_str(&src);
        assert_eq!(report.groups.vertex_count(), 3);
        assert_eq!(report.skipped.len(), 1);
    }

    #[test]
    fn reader_decodes_non_utf8_lossily() {
        let mut bytes = b"v 0 0 0\nv 1 0 0\nv 0 1 0\n# \xff\xfe junk\nf 1 2 3\n".to_vec();
        bytes.extend_from_slice(b"usemtl Caf\xe9\nf 1 2 3\n");
        let report = parse_obj_report(io::Cursor::new(bytes)).expect("parse from reader");
        assert_eq!(report.groups.len(), 2);
        assert_eq!(report.groups.get(DEFAULT_MATERIAL).map(<[_]>::len), Some(3));
    }

    #[test]
    fn reader_groups_by_material() {
        let src = format!(
            "{TRIANGLE_POOL}
            usemtl Wood
            f 1 2 3
            f 3 2 1
            usemtl Stone
            f 1 2 3
            "
        );
        let groups = load_obj_by_material_from_reader(io::Cursor::new(src.into_bytes()))
            .expect("parse from reader");
        assert_eq!(groups.get("Wood").map(<[_]>::len), Some(6));
        assert_eq!(groups.get("Stone").map(<[_]>::len), Some(3));
    }

    /// Serves `data`, then fails every later read.
    struct FailsAfter(io::Cursor<Vec<u8>>);

    impl io::Read for FailsAfter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match io::Read::read(&mut self.0, buf)? {
                0 => Err(io::Error::other("device went away")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn read_failure_mid_file_is_fatal() {
        let data = b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n".to_vec();
        let reader = io::BufReader::new(FailsAfter(io::Cursor::new(data)));
        match parse_obj_report(reader) {
            Err(ObjError::Read { line, source }) => {
                assert_eq!(line, 5);
                assert_eq!(source.kind(), io::ErrorKind::Other);
            }
            other => panic!("expected a read error, got {other:?}"),
        }
    }

    #[test]
    fn oversized_attribute_index_falls_back_to_default() {
        let src = format!(
            "{TRIANGLE_POOL}
            vt 0.5 0.5
            f 1/99999999999999999999 2/-99999999999999999999 3/1
            "
        );
        let report = report_from_str(&src);
        assert!(report.skipped.is_empty(), "{:?}", report.skipped);
        let verts = report.groups.get(DEFAULT_MATERIAL).expect("default group");
        assert_eq!(verts[0].uv, DEFAULT_UV);
        assert_eq!(verts[1].uv, DEFAULT_UV);
        assert_eq!(verts[2].uv, [0.5, 0.5]);
    }

    #[test]
    fn oversized_position_index_is_out_of_range() {
        let src = format!("{TRIANGLE_POOL}\nf 99999999999999999999 2 3\n");
        let report = report_from_str(&src);
        assert!(report.groups.is_empty());
        assert_eq!(
            reasons(&report),
            vec![SkipReason::IndexOutOfRange {
                index: i64::MAX,
                len: 3
            }]
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_obj_by_material("definitely/not/here.obj").unwrap_err();
        assert!(matches!(err, ObjError::ResourceUnavailable { .. }));
        assert!(err.to_string().contains("here.obj"));
    }
}
