use anyhow::{Context, Result, anyhow};
use git2::{Repository, Signature, Time};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

const FALLBACK_NAME: &str = "Focus MCP Server";
const FALLBACK_EMAIL: &str = "focus-mcp@localhost";

/// Keeps the calendar file under version control when it lives in a git
/// working tree. Every operation is a no-op outside a repository.
pub struct GitOps {
    repo: Option<Mutex<Repository>>,
}

impl GitOps {
    /// Discover the repository containing `file_path`, if any.
    pub fn new(file_path: &Path) -> Self {
        let dir = if file_path.is_dir() {
            file_path
        } else {
            match file_path.parent() {
                Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
                Some(parent) => parent,
                None => file_path,
            }
        };
        let repo = Repository::discover(dir).ok();
        if let Some(r) = &repo {
            debug!(workdir = ?r.workdir(), "data file is git managed");
        }
        Self {
            repo: repo.map(Mutex::new),
        }
    }

    pub fn is_git_managed(&self) -> bool {
        self.repo.is_some()
    }

    fn lock(&self) -> Option<MutexGuard<'_, Repository>> {
        self.repo.as_ref().map(|r| r.lock().unwrap())
    }

    fn current_branch(repo: &Repository) -> Result<String> {
        let head = repo.head().context("Failed to get HEAD")?;
        head.shorthand()
            .map(str::to_string)
            .context("Failed to get branch name")
    }

    /// Fetch `origin` and fast-forward the current branch.
    pub fn pull(&self) -> Result<()> {
        let Some(repo) = self.lock() else {
            return Ok(());
        };
        let branch = Self::current_branch(&repo)?;

        repo.find_remote("origin")
            .context("Failed to find remote 'origin'")?
            .fetch(&[branch.as_str()], None, None)
            .context("Failed to fetch from origin")?;

        let fetch_head = repo.find_reference("FETCH_HEAD")?;
        let incoming = repo.reference_to_annotated_commit(&fetch_head)?;
        let (analysis, _) = repo.merge_analysis(&[&incoming])?;

        if analysis.is_up_to_date() {
            return Ok(());
        }
        if analysis.is_fast_forward() {
            let refname = format!("refs/heads/{}", branch);
            repo.find_reference(&refname)?
                .set_target(incoming.id(), "Fast-forward")?;
            repo.set_head(&refname)?;
            repo.checkout_head(Some(git2::build::CheckoutBuilder::default().force()))?;
            info!(%branch, "fast-forwarded from origin");
            return Ok(());
        }

        Err(anyhow!(
            "Remote has diverged from local branch '{}'; merge it manually",
            branch
        ))
    }

    /// Stage `file_path` and commit it with `message`.
    pub fn commit(&self, file_path: &Path, message: &str) -> Result<()> {
        let Some(repo) = self.lock() else {
            return Ok(());
        };

        let workdir = repo
            .workdir()
            .context("Repository has no working directory")?;
        let relative = file_path
            .strip_prefix(workdir)
            .context("File is not in repository")?;

        let mut index = repo.index()?;
        index.add_path(relative)?;
        index.write()?;
        let tree = repo.find_tree(index.write_tree()?)?;

        let parent = match repo.head() {
            Ok(head) => Some(
                repo.find_commit(head.target().context("HEAD has no target")?)?,
            ),
            Err(_) => None,
        };
        let parents: Vec<_> = parent.iter().collect();
        let signature = Self::signature(&repo)?;

        let oid = repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;
        debug!(%oid, message, "committed data file");
        Ok(())
    }

    /// Push the current branch to `origin`.
    pub fn push(&self) -> Result<()> {
        let Some(repo) = self.lock() else {
            return Ok(());
        };
        let branch = Self::current_branch(&repo)?;
        let refspec = format!("refs/heads/{}", branch);
        repo.find_remote("origin")
            .context("Failed to find remote 'origin'")?
            .push(&[refspec.as_str()], None)?;
        Ok(())
    }

    /// Configured user, or the server's own identity. Falls back to a fixed
    /// timestamp where the clock is unavailable.
    fn signature(repo: &Repository) -> Result<Signature<'static>> {
        let config = repo.config()?;
        let name = config
            .get_string("user.name")
            .unwrap_or_else(|_| FALLBACK_NAME.to_string());
        let email = config
            .get_string("user.email")
            .unwrap_or_else(|_| FALLBACK_EMAIL.to_string());

        Signature::now(&name, &email).or_else(|_| {
            Signature::new(&name, &email, &Time::new(1_700_000_000, 0))
                .context("Failed to create signature with fixed time")
        })
    }

    /// Pull, commit, push.
    pub fn sync(&self, file_path: &Path, commit_message: &str) -> Result<()> {
        if !self.is_git_managed() {
            return Ok(());
        }
        self.pull().context("Failed to pull changes")?;
        self.commit(file_path, commit_message)
            .context("Failed to commit changes")?;
        self.push().context("Failed to push changes")?;
        Ok(())
    }
}
