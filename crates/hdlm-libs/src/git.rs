//! Git operations behind a trait, with a libgit2 implementation.

use std::path::Path;

use git2::build::CheckoutBuilder;
use git2::{AutotagOption, FetchOptions, Repository};

use crate::{Error, Result, VersionSelector};

/// What the library manager needs from version control.
pub trait SourceControl {
    /// Clone `url` into `target`, which must not exist.
    fn clone_repo(&self, url: &str, target: &Path) -> Result<()>;

    /// Fetch all branches and tags from `origin`.
    fn fetch(&self, repo: &Path) -> Result<()>;

    /// Check out the pinned reference with a detached HEAD.
    fn checkout(&self, repo: &Path, selector: &VersionSelector) -> Result<()>;
}

/// [`SourceControl`] over `git2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Git2Backend;

impl Git2Backend {
    fn open(path: &Path) -> Result<Repository> {
        Repository::open(path).map_err(|e| Error::git("open", path.display().to_string(), e))
    }
}

impl SourceControl for Git2Backend {
    fn clone_repo(&self, url: &str, target: &Path) -> Result<()> {
        tracing::info!(url = %url, target = %target.display(), "cloning library");
        Repository::clone(url, target).map_err(|e| Error::git("clone", url, e))?;
        Ok(())
    }

    fn fetch(&self, path: &Path) -> Result<()> {
        let repo = Self::open(path)?;
        let mut remote = repo
            .find_remote("origin")
            .map_err(|e| Error::git("fetch", path.display().to_string(), e))?;

        let mut opts = FetchOptions::new();
        opts.download_tags(AutotagOption::All);
        remote
            .fetch(
                &[
                    "+refs/heads/*:refs/remotes/origin/*",
                    "+refs/tags/*:refs/tags/*",
                ],
                Some(&mut opts),
                None,
            )
            .map_err(|e| Error::git("fetch", path.display().to_string(), e))?;

        tracing::debug!(path = %path.display(), "fetched library");
        Ok(())
    }

    fn checkout(&self, path: &Path, selector: &VersionSelector) -> Result<()> {
        let repo = Self::open(path)?;
        let revision = selector.revision();
        let checkout_err = |e: git2::Error| Error::git("checkout", format!("{} ({revision})", path.display()), e);

        let commit = repo
            .revparse_single(&revision)
            .and_then(|object| object.peel_to_commit())
            .map_err(checkout_err)?;

        repo.checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().force()))
            .map_err(checkout_err)?;
        repo.set_head_detached(commit.id()).map_err(checkout_err)?;

        tracing::debug!(path = %path.display(), %revision, commit = %commit.id(), "checked out library");
        Ok(())
    }
}
