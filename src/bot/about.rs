use crate::content::{Catalog, TeamMember};
use crate::i18n::Language;

/// Stack the bot runs on, listed on the about page.
pub const TOOLS: &[&str] = &["Rust", "tokio", "teloxide", "Groq API", "Supabase"];

fn render_member(member: &TeamMember, lang: Language) -> String {
    let mut out = format!("👤 {}\n{}", member.name, member.role.get(lang));
    for contribution in member.contributions.get(lang) {
        out.push_str("\n  • ");
        out.push_str(contribution);
    }
    out
}

pub fn render_about(catalog: &Catalog, lang: Language, model: &str) -> String {
    let texts = lang.texts();
    let team = if catalog.team().is_empty() {
        texts.about_no_team.to_string()
    } else {
        catalog
            .team()
            .iter()
            .map(|member| render_member(member, lang))
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    format!(
        "{}\n\n{}:\n\n{}\n\n🤖 {}\n{}\n{}: {}\n{}: {}",
        texts.about_title,
        texts.about_team,
        team,
        texts.about_ai_title,
        texts.about_ai_description,
        texts.about_model,
        model,
        texts.about_tools,
        TOOLS.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::content::team::Localized;

    fn member() -> TeamMember {
        TeamMember {
            name: "Gia Bảo".to_string(),
            role: Localized {
                vi: "Kiểm thử Quiz".to_string(),
                en: "Quiz Testing".to_string(),
            },
            contributions: Localized {
                vi: vec!["Viết tài liệu kỹ thuật".to_string()],
                en: vec!["Write technical documentation".to_string()],
            },
            avatar: None,
        }
    }

    fn catalog(team: Vec<TeamMember>) -> Catalog {
        Catalog::new(Vec::new(), HashMap::new(), Vec::new())
            .unwrap()
            .with_team(team)
    }

    #[test]
    fn about_lists_team_in_the_chosen_language() {
        let page = render_about(&catalog(vec![member()]), Language::English, "llama-3.3-70b-versatile");
        assert!(page.starts_with("About the HCM202 project"));
        assert!(page.contains("👤 Gia Bảo\nQuiz Testing\n  • Write technical documentation"));
        assert!(!page.contains("Kiểm thử Quiz"));
        assert!(page.contains("Model: llama-3.3-70b-versatile"));
        assert!(page.contains("teloxide"));

        let page = render_about(&catalog(vec![member()]), Language::Vietnamese, "m");
        assert!(page.contains("Kiểm thử Quiz"));
        assert!(page.contains("Mô hình: m"));
    }

    #[test]
    fn about_without_team_says_so() {
        let page = render_about(&catalog(Vec::new()), Language::English, "m");
        assert!(page.contains(Language::English.texts().about_no_team));
    }
}
