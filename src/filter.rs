//! Narrow the owned repositories down to the forks worth publishing
use crate::{platform::RepositoryHost, utils::RepositorySummary};

/// Keep only the forks, in listing order
pub fn filter_forks(all_repos: &[RepositorySummary]) -> Vec<RepositorySummary> {
    println!("Finding only your forks");
    let forks: Vec<RepositorySummary> = all_repos.iter().filter(|repo| repo.fork).cloned().collect();
    println!("Found {} forks out of {} repos", forks.len(), all_repos.len());
    forks
}

/// Keep the forks whose parent is owned by `source_org`.
///
/// The parent is only known after fetching each fork individually. A fork
/// whose detail can't be fetched is left out, it does not stop the run.
pub async fn filter_student_forks(
    host: &dyn RepositoryHost,
    forks: &[RepositorySummary],
    source_org: &str,
) -> Vec<RepositorySummary> {
    println!("Finding just the {source_org} forks");
    let mut student_forks = Vec::new();
    for fork in forks {
        match host.get_repository(&fork.owner_login, &fork.name).await {
            Ok(detail) if detail.parent_owner_login() == Some(source_org) => {
                student_forks.push(fork.clone());
            }
            Ok(_) => {}
            Err(e) => {
                log::debug!("Leaving out {}: {e}", fork.full_name());
            }
        }
    }
    println!("Found {} {source_org} forks", student_forks.len());
    student_forks
}
