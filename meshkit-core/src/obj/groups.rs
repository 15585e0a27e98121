//! Named groups and their per-material sub-meshes.

use crate::geometry::{MeshBuilder, TriangleMesh};

/// A run of geometry within one group that shares a single material.
#[derive(Debug, Clone)]
pub struct SubMesh {
    material: Option<String>,
    texture_map: Option<String>,
    builder: MeshBuilder,
    latched: bool,
}

impl SubMesh {
    fn new(material: Option<String>, texture_map: Option<String>) -> Self {
        Self {
            material,
            texture_map,
            builder: MeshBuilder::default(),
            latched: false,
        }
    }

    /// Name of the material set by `usemtl`, if any.
    pub fn material(&self) -> Option<&str> {
        self.material.as_deref()
    }

    /// Texture set by `usemap`, overriding the material's diffuse map.
    pub fn texture_map(&self) -> Option<&str> {
        self.texture_map.as_deref()
    }

    pub fn emits_texcoords(&self) -> bool {
        self.builder.creates_texcoords()
    }

    pub fn emits_normals(&self) -> bool {
        self.builder.creates_normals()
    }

    /// Whether the first face has fixed which attributes this sub-mesh carries.
    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Fix attribute presence. Later calls are ignored.
    pub(crate) fn latch(&mut self, texcoords: bool, normals: bool) {
        if !self.latched {
            self.builder.set_attributes(normals, texcoords);
            self.latched = true;
        }
    }

    pub fn builder(&self) -> &MeshBuilder {
        &self.builder
    }

    pub(crate) fn builder_mut(&mut self) -> &mut MeshBuilder {
        &mut self.builder
    }

    pub fn is_empty(&self) -> bool {
        !self.builder.has_triangles()
    }

    pub fn into_mesh(self) -> TriangleMesh {
        self.builder.into_mesh()
    }

    pub(crate) fn into_parts(self) -> (Option<String>, Option<String>, TriangleMesh) {
        (self.material, self.texture_map, self.builder.into_mesh())
    }
}

/// A named group. Always holds at least one sub-mesh.
#[derive(Debug, Clone)]
pub struct Group {
    name: String,
    sub_meshes: Vec<SubMesh>,
}

impl Group {
    fn new(name: String, material: Option<String>, texture_map: Option<String>) -> Self {
        Self {
            name,
            sub_meshes: vec![SubMesh::new(material, texture_map)],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sub_meshes(&self) -> &[SubMesh] {
        &self.sub_meshes
    }

    pub fn into_sub_meshes(self) -> Vec<SubMesh> {
        self.sub_meshes
    }

    fn current_mut(&mut self) -> &mut SubMesh {
        let last = self.sub_meshes.len() - 1;
        &mut self.sub_meshes[last]
    }
}

/// Ordered group list plus the material state that new sub-meshes inherit.
#[derive(Debug, Default)]
pub(crate) struct GroupList {
    groups: Vec<Group>,
    material: Option<String>,
    texture_map: Option<String>,
}

impl GroupList {
    pub const DEFAULT_NAME: &'static str = "default";

    /// Start a new group carrying the current material forward.
    pub fn begin_group(&mut self, name: &str) {
        let name = if name.is_empty() {
            Self::DEFAULT_NAME
        } else {
            name
        };
        self.groups.push(Group::new(
            name.to_string(),
            self.material.clone(),
            self.texture_map.clone(),
        ));
    }

    /// The sub-mesh faces are currently emitted into, creating a `default` group if needed.
    pub fn current_mut(&mut self) -> &mut SubMesh {
        if self.groups.is_empty() {
            self.begin_group(Self::DEFAULT_NAME);
        }
        let last = self.groups.len() - 1;
        self.groups[last].current_mut()
    }

    /// Switch material. Returns `true` if a new sub-mesh was started.
    pub fn set_material(&mut self, material: Option<String>) -> bool {
        self.material = material;
        self.apply_material_state()
    }

    /// Switch texture map. Returns `true` if a new sub-mesh was started.
    pub fn set_texture_map(&mut self, texture_map: Option<String>) -> bool {
        self.texture_map = texture_map;
        self.apply_material_state()
    }

    fn apply_material_state(&mut self) -> bool {
        let Some(group) = self.groups.last_mut() else {
            return false;
        };
        let current = group.current_mut();
        if current.is_empty() {
            current.material = self.material.clone();
            current.texture_map = self.texture_map.clone();
            false
        } else {
            group
                .sub_meshes
                .push(SubMesh::new(self.material.clone(), self.texture_map.clone()));
            true
        }
    }

    pub fn into_groups(self) -> Vec<Group> {
        self.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn emit_triangle(groups: &mut GroupList) {
        let builder = groups.current_mut().builder_mut();
        let a = builder.add_vertex(Point3::new(0.0, 0.0, 0.0), None, None);
        let b = builder.add_vertex(Point3::new(1.0, 0.0, 0.0), None, None);
        let c = builder.add_vertex(Point3::new(0.0, 1.0, 0.0), None, None);
        builder.add_triangle(a, b, c);
    }

    #[test]
    fn test_default_group_is_created_lazily() {
        let mut groups = GroupList::default();
        groups.set_material(Some("red".to_string()));
        groups.current_mut();

        let groups = groups.into_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name(), "default");
        assert_eq!(groups[0].sub_meshes()[0].material(), Some("red"));
    }

    #[test]
    fn test_material_switch_without_geometry_reuses_sub_mesh() {
        let mut groups = GroupList::default();
        groups.begin_group("a");
        assert!(!groups.set_material(Some("x".to_string())));
        assert!(!groups.set_material(Some("y".to_string())));

        let groups = groups.into_groups();
        assert_eq!(groups[0].sub_meshes().len(), 1);
        assert_eq!(groups[0].sub_meshes()[0].material(), Some("y"));
    }

    #[test]
    fn test_material_switch_after_geometry_splits() {
        let mut groups = GroupList::default();
        groups.begin_group("a");
        groups.set_material(Some("x".to_string()));
        emit_triangle(&mut groups);
        assert!(groups.set_texture_map(Some("wood.png".to_string())));

        let groups = groups.into_groups();
        let subs = groups[0].sub_meshes();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[1].material(), Some("x"));
        assert_eq!(subs[1].texture_map(), Some("wood.png"));
    }

    #[test]
    fn test_new_group_inherits_material() {
        let mut groups = GroupList::default();
        groups.set_material(Some("x".to_string()));
        groups.begin_group("");
        groups.begin_group("b");

        let groups = groups.into_groups();
        assert_eq!(groups[0].name(), "default");
        assert_eq!(groups[1].sub_meshes()[0].material(), Some("x"));
    }
}
