use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use grapher_commands::{Command, FunctionId, Machine, render_lines};
use grapher_fixed::IntDivision;
use serde::Serialize;

use crate::PackError;

#[derive(Serialize)]
struct PackMcmeta<'a> {
    pack: PackSection<'a>,
}

#[derive(Serialize)]
struct PackSection<'a> {
    pack_format: u32,
    description: &'a str,
}

#[derive(Serialize)]
struct FunctionTag {
    values: Vec<String>,
}

/// A file relative to the pack root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackFile {
    pub path: PathBuf,
    pub contents: String,
}

/// Functions by id plus the load/tick function tags and pack metadata.
#[derive(Clone, Debug)]
pub struct Datapack {
    pub pack_format: u32,
    pub description: String,
    functions: BTreeMap<FunctionId, Vec<Command>>,
    load: Vec<FunctionId>,
    tick: Vec<FunctionId>,
}

impl Datapack {
    pub fn new(pack_format: u32, description: impl Into<String>) -> Self {
        Self {
            pack_format,
            description: description.into(),
            functions: BTreeMap::new(),
            load: Vec::new(),
            tick: Vec::new(),
        }
    }

    pub fn add_function(&mut self, id: FunctionId, body: Vec<Command>) {
        log::debug!("function {id}: {} commands", body.len());
        if self.functions.insert(id.clone(), body).is_some() {
            log::warn!("function {id} defined twice; keeping the later body");
        }
    }

    pub fn on_load(&mut self, id: FunctionId) {
        self.load.push(id);
    }

    pub fn on_tick(&mut self, id: FunctionId) {
        self.tick.push(id);
    }

    pub fn function(&self, id: &FunctionId) -> Option<&[Command]> {
        self.functions.get(id).map(Vec::as_slice)
    }

    pub fn functions(&self) -> impl Iterator<Item = (&FunctionId, &[Command])> {
        self.functions.iter().map(|(id, body)| (id, body.as_slice()))
    }

    pub fn load_tag(&self) -> &[FunctionId] {
        &self.load
    }

    pub fn tick_tag(&self) -> &[FunctionId] {
        &self.tick
    }

    /// Command machine with every function defined.
    pub fn machine(&self, division: IntDivision) -> Machine {
        Machine::new(division).with_functions(
            self.functions
                .iter()
                .map(|(id, body)| (id.clone(), body.clone())),
        )
    }

    pub fn files(&self) -> Result<Vec<PackFile>, PackError> {
        let mut out = Vec::with_capacity(self.functions.len() + 3);
        let meta = PackMcmeta {
            pack: PackSection {
                pack_format: self.pack_format,
                description: &self.description,
            },
        };
        out.push(PackFile {
            path: PathBuf::from("pack.mcmeta"),
            contents: to_json("pack.mcmeta", &meta)?,
        });
        for (name, ids) in [("load", &self.load), ("tick", &self.tick)] {
            if ids.is_empty() {
                continue;
            }
            let tag = FunctionTag {
                values: ids.iter().map(ToString::to_string).collect(),
            };
            out.push(PackFile {
                path: PathBuf::from(format!("data/minecraft/tags/functions/{name}.json")),
                contents: to_json("function tag", &tag)?,
            });
        }
        for (id, body) in &self.functions {
            out.push(PackFile {
                path: function_path(id),
                contents: render_lines(body),
            });
        }
        Ok(out)
    }

    /// Replace the contents of `dir` with this pack. Returns the number of
    /// files written.
    pub fn write_to(&self, dir: &Path) -> Result<usize, PackError> {
        let files = self.files()?;
        empty_folder(dir)?;
        for file in &files {
            let path = dir.join(&file.path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|source| PackError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::write(&path, &file.contents).map_err(|source| PackError::Write { path, source })?;
        }
        log::info!("wrote {} files to {}", files.len(), dir.display());
        Ok(files.len())
    }
}

/// `data/<namespace>/functions/<path>.mcfunction`
pub fn function_path(id: &FunctionId) -> PathBuf {
    let mut path: PathBuf = ["data", id.namespace().as_str(), "functions"].iter().collect();
    path.extend(id.path().split('/'));
    let file = path.file_name().map(|f| f.to_string_lossy().into_owned());
    if let Some(file) = file {
        path.set_file_name(format!("{file}.mcfunction"));
    }
    path
}

fn to_json<T: Serialize>(file: &'static str, value: &T) -> Result<String, PackError> {
    let mut s =
        serde_json::to_string_pretty(value).map_err(|source| PackError::Json { file, source })?;
    s.push('\n');
    Ok(s)
}

/// Clear a previous build. Only directories that are empty or already hold
/// a pack are touched.
fn empty_folder(dir: &Path) -> Result<(), PackError> {
    let write_err = |source| PackError::Write {
        path: dir.to_path_buf(),
        source,
    };
    if !dir.exists() {
        return fs::create_dir_all(dir).map_err(write_err);
    }
    let mut entries = fs::read_dir(dir).map_err(write_err)?;
    let is_empty = entries.next().is_none();
    if !is_empty && !dir.join("pack.mcmeta").is_file() {
        return Err(PackError::NotAPack(dir.to_path_buf()));
    }
    fs::remove_dir_all(dir).map_err(write_err)?;
    fs::create_dir_all(dir).map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grapher_commands::Namespace;

    fn id(path: &str) -> FunctionId {
        Namespace::new("3d-grapher").unwrap().id(path).unwrap()
    }

    #[test]
    fn nested_function_path() {
        assert_eq!(
            function_path(&id("zzz_internal/calc_sine")),
            PathBuf::from("data/3d-grapher/functions/zzz_internal/calc_sine.mcfunction")
        );
    }

    #[test]
    fn files_include_meta_and_tags() {
        let mut pack = Datapack::new(7, "Animated \"3D\" Grapher");
        pack.add_function(id("init"), vec![Command::Function(id("a"))]);
        pack.on_load(id("init"));
        let files = pack.files().unwrap();
        assert_eq!(files.len(), 3);
        let meta: serde_json::Value = serde_json::from_str(&files[0].contents).unwrap();
        assert_eq!(meta["pack"]["pack_format"], 7);
        assert_eq!(meta["pack"]["description"], "Animated \"3D\" Grapher");
        assert_eq!(files[1].path, PathBuf::from("data/minecraft/tags/functions/load.json"));
        let tag: serde_json::Value = serde_json::from_str(&files[1].contents).unwrap();
        assert_eq!(tag["values"][0], "3d-grapher:init");
        assert_eq!(files[2].contents, "function 3d-grapher:a\n");
    }
}
