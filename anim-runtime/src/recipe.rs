//! # Recipe 模块
//!
//! 动画配方。
//!
//! 闭包无法序列化，所以快照只记录进度；恢复时按动画 ID 找到配方，
//! 重新构造出同样结构的步骤，再把进度覆盖上去。

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::builder::Sequence;
use crate::error::SnapshotError;

/// 配方：在空序列上追加步骤
pub type Recipe = Rc<dyn Fn(Sequence) -> Sequence>;

/// 配方表（动画 ID -> 配方）
#[derive(Clone, Default)]
pub struct RecipeBook {
    recipes: HashMap<String, Recipe>,
}

impl RecipeBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册配方，同名配方会被覆盖
    pub fn define(&mut self, id: impl Into<String>, recipe: impl Fn(Sequence) -> Sequence + 'static) {
        self.recipes.insert(id.into(), Rc::new(recipe));
    }

    /// 链式注册
    pub fn with(mut self, id: impl Into<String>, recipe: impl Fn(Sequence) -> Sequence + 'static) -> Self {
        self.define(id, recipe);
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.recipes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// 所有配方 ID（已排序）
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.recipes.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// 按配方构造序列
    pub fn build(&self, id: &str) -> Result<Sequence, SnapshotError> {
        let recipe = self
            .recipes
            .get(id)
            .ok_or_else(|| SnapshotError::UnknownRecipe { id: id.to_string() })?;
        Ok(recipe(Sequence::new()))
    }

    /// 合并另一张配方表，同名时以 `other` 为准
    pub fn merge(&mut self, other: RecipeBook) {
        self.recipes.extend(other.recipes);
    }
}

impl fmt::Debug for RecipeBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecipeBook")
            .field("recipes", &self.ids())
            .finish()
    }
}
