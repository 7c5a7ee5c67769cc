//! Download plans: where to fetch an archive and how to install it

use serde::Serialize;
use skillpack_cache::CacheKey;
use skillpack_config::ServerSection;

/// Everything a client needs to install a skill bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadPlan {
    /// Archive key served at the URL
    pub key: CacheKey,
    pub download_url: String,
    /// Skills contained in the archive, requested skill first
    pub skills: Vec<String>,
    pub install_dir: String,
    /// Shell one-liner that downloads, unpacks without overwriting, and
    /// removes the archive
    pub instruction: String,
}

impl DownloadPlan {
    /// Plan for `id` bundled with its dependencies
    pub fn for_skill(server: &ServerSection, id: &str, skills: Vec<String>) -> Self {
        let key = CacheKey::WithDeps(id.to_string());
        let local_name = format!("{}.tar.gz", id);
        Self::build(server, key, &local_name, skills)
    }

    /// Plan for the whole catalog
    pub fn for_all(server: &ServerSection, skills: Vec<String>) -> Self {
        Self::build(server, CacheKey::All, "all-skills.tar.gz", skills)
    }

    fn build(server: &ServerSection, key: CacheKey, local_name: &str, skills: Vec<String>) -> Self {
        let download_url = format!("{}/download/{}", server.base_url.trim_end_matches('/'), key.stem());
        let dir = server.install_dir.trim_end_matches('/');
        let archive = format!("{}/{}", dir, local_name);
        let instruction = format!(
            "mkdir -p {dir} && curl -o {archive} {download_url} && tar -xkzf {archive} -C {dir}/ && rm {archive}"
        );

        Self {
            key,
            download_url,
            skills,
            install_dir: dir.to_string(),
            instruction,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_plan() {
        let server = ServerSection::default();
        let plan = DownloadPlan::for_skill(&server, "devops-flow", vec!["devops-flow".into(), "tdd".into()]);

        assert_eq!(plan.download_url, "http://localhost:8002/download/devops-flow-with-deps");
        assert_eq!(plan.install_dir, "~/.claude/skills");
        assert_eq!(
            plan.instruction,
            "mkdir -p ~/.claude/skills && curl -o ~/.claude/skills/devops-flow.tar.gz \
             http://localhost:8002/download/devops-flow-with-deps && tar -xkzf \
             ~/.claude/skills/devops-flow.tar.gz -C ~/.claude/skills/ && rm ~/.claude/skills/devops-flow.tar.gz"
        );
    }

    #[test]
    fn test_all_plan_trims_slashes() {
        let server = ServerSection {
            base_url: "https://skills.example.com/".to_string(),
            install_dir: "/opt/skills/".to_string(),
        };
        let plan = DownloadPlan::for_all(&server, vec!["a".into()]);

        assert_eq!(plan.key, CacheKey::All);
        assert_eq!(plan.download_url, "https://skills.example.com/download/all");
        assert!(plan.instruction.starts_with("mkdir -p /opt/skills && curl -o /opt/skills/all-skills.tar.gz"));
    }
}
