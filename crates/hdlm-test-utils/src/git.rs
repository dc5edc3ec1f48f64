//! Git repository fixtures built with `git2`.
//!
//! A [`FixtureRepo`] stands in for a remote library: tests clone it through
//! [`FixtureRepo::url`], which is a plain filesystem path.

use std::fs;
use std::path::{Path, PathBuf};

use git2::{Oid, Repository, RepositoryInitOptions, Signature};

/// A non-bare repository whose default branch is `main`.
pub struct FixtureRepo {
    path: PathBuf,
    repo: Repository,
}

impl FixtureRepo {
    /// Initialise an empty repository at `path`.
    ///
    /// # Panics
    /// Panics if `git2::Repository::init_opts` fails.
    pub fn init(path: &Path) -> Self {
        fs::create_dir_all(path)
            .unwrap_or_else(|e| panic!("FixtureRepo::init: failed to create {}: {e}", path.display()));
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(path, &opts).unwrap_or_else(|e| {
            panic!("FixtureRepo::init: failed to init repository at {}: {e}", path.display())
        });
        Self {
            path: path.to_path_buf(),
            repo,
        }
    }

    /// Initialise a repository with one commit holding `README.md`.
    pub fn with_commit(path: &Path) -> Self {
        let fixture = Self::init(path);
        fixture.commit_file("README.md", "# fixture\n", "Initial commit");
        fixture
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Clone URL for this repository.
    pub fn url(&self) -> String {
        self.path.display().to_string()
    }

    /// Write `relative` and commit it on the current branch.
    ///
    /// # Panics
    /// Panics if any filesystem or git operation fails.
    pub fn commit_file(&self, relative: &str, content: &str, message: &str) -> Oid {
        let target = self.path.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&target, content)
            .unwrap_or_else(|e| panic!("commit_file: failed to write {}: {e}", target.display()));

        let mut index = self.repo.index().unwrap();
        index.add_path(Path::new(relative)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();

        let signature = Signature::now("Test User", "test@test.com").unwrap();
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .unwrap_or_else(|e| panic!("commit_file: commit failed: {e}"))
    }

    /// Lightweight tag on HEAD.
    pub fn tag(&self, name: &str) -> Oid {
        let head = self.head_commit();
        self.repo
            .tag_lightweight(name, head.as_object(), false)
            .unwrap_or_else(|e| panic!("tag: failed to create tag {name}: {e}"));
        head.id()
    }

    /// Create a branch at HEAD and switch to it.
    pub fn branch(&self, name: &str) {
        let head = self.head_commit();
        self.repo
            .branch(name, &head, false)
            .unwrap_or_else(|e| panic!("branch: failed to create branch {name}: {e}"));
        self.switch(name);
    }

    /// Point HEAD at an existing local branch and update the working tree.
    pub fn switch(&self, name: &str) {
        self.repo
            .set_head(&format!("refs/heads/{name}"))
            .unwrap_or_else(|e| panic!("switch: unknown branch {name}: {e}"));
        self.repo
            .checkout_head(Some(git2::build::CheckoutBuilder::new().force()))
            .unwrap();
    }

    /// Commit id HEAD points at.
    pub fn head(&self) -> Oid {
        self.head_commit().id()
    }

    fn head_commit(&self) -> git2::Commit<'_> {
        self.repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .unwrap_or_else(|e| panic!("FixtureRepo: repository has no commits: {e}"))
    }
}

/// Commit id checked out in a cloned library directory.
pub fn checked_out_commit(path: &Path) -> Oid {
    let repo = Repository::open(path)
        .unwrap_or_else(|e| panic!("checked_out_commit: {} is not a repository: {e}", path.display()));
    repo.head().unwrap().peel_to_commit().unwrap().id()
}
