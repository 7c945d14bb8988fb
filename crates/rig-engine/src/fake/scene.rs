use crate::{ArmatureInfo, MeshInfo, SceneSummary};

#[derive(Debug, Clone, PartialEq)]
pub struct FakeMesh {
    pub name: String,
    pub vertices: Vec<[f64; 3]>,
}

/// Escena de texto línea a línea:
///
/// ```text
/// a <armature> <bone> <bone> ...
/// o <mesh>
/// v <x> <y> <z>
/// m <16 valores, matriz 4x4 por filas>
/// p <armature padre>
/// ```
///
/// Cualquier otra línea (comentarios, `f`, `vn`, `vt`, ...) se ignora, así
/// que un OBJ simple es una escena válida. Vértices antes de cualquier `o`
/// van a una malla implícita llamada `Mesh`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FakeScene {
    pub armatures: Vec<ArmatureInfo>,
    pub meshes: Vec<FakeMesh>,
    pub transform: Option<[[f64; 4]; 4]>,
    pub parent: Option<String>,
}

fn parse_f64(tok: Option<&str>, line_no: usize) -> Result<f64, String> {
    tok.ok_or_else(|| format!("line {line_no}: missing coordinate"))?
       .parse::<f64>()
       .map_err(|e| format!("line {line_no}: {e}"))
}

impl FakeScene {
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut scene = FakeScene::default();
        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let mut toks = raw.split_whitespace();
            match toks.next() {
                Some("a") => {
                    let name = toks.next()
                                   .ok_or_else(|| format!("line {line_no}: armature without name"))?;
                    scene.armatures.push(ArmatureInfo { name: name.to_string(),
                                                        bones: toks.map(str::to_string).collect() });
                }
                Some("o") => {
                    let name = toks.next().unwrap_or("Mesh").to_string();
                    scene.meshes.push(FakeMesh { name,
                                                 vertices: Vec::new() });
                }
                Some("v") => {
                    let v = [parse_f64(toks.next(), line_no)?,
                             parse_f64(toks.next(), line_no)?,
                             parse_f64(toks.next(), line_no)?];
                    if scene.meshes.is_empty() {
                        scene.meshes.push(FakeMesh { name: "Mesh".into(),
                                                     vertices: Vec::new() });
                    }
                    if let Some(mesh) = scene.meshes.last_mut() {
                        mesh.vertices.push(v);
                    }
                }
                Some("m") => {
                    let mut m = [[0.0; 4]; 4];
                    for row in m.iter_mut() {
                        for cell in row.iter_mut() {
                            *cell = parse_f64(toks.next(), line_no)?;
                        }
                    }
                    scene.transform = Some(m);
                }
                Some("p") => scene.parent = toks.next().map(str::to_string),
                _ => {}
            }
        }
        Ok(scene)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for a in &self.armatures {
            out.push_str(&format!("a {}", a.name));
            for b in &a.bones {
                out.push(' ');
                out.push_str(b);
            }
            out.push('\n');
        }
        for mesh in &self.meshes {
            out.push_str(&format!("o {}\n", mesh.name));
            for v in &mesh.vertices {
                out.push_str(&format!("v {} {} {}\n", v[0], v[1], v[2]));
            }
        }
        if let Some(m) = &self.transform {
            let cells: Vec<String> = m.iter().flatten().map(|c| c.to_string()).collect();
            out.push_str(&format!("m {}\n", cells.join(" ")));
        }
        if let Some(p) = &self.parent {
            out.push_str(&format!("p {p}\n"));
        }
        out
    }

    pub fn from_mesh(mesh: FakeMesh) -> Self {
        Self { meshes: vec![mesh],
               ..Self::default() }
    }

    /// Todas las mallas unidas en una (nombre de la primera); `None` si no
    /// hay vértices.
    pub fn joined(&self) -> Option<FakeMesh> {
        let first = self.meshes.first()?;
        let vertices: Vec<[f64; 3]> = self.meshes.iter().flat_map(|m| m.vertices.iter().copied()).collect();
        if vertices.is_empty() {
            return None;
        }
        Some(FakeMesh { name: first.name.clone(),
                        vertices })
    }

    pub fn summary(&self) -> SceneSummary {
        SceneSummary { armatures: self.armatures.clone(),
                       meshes: self.meshes
                                   .iter()
                                   .map(|m| MeshInfo { name: m.name.clone(),
                                                       vertex_count: m.vertices.len() })
                                   .collect() }
    }
}
