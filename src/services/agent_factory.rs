//! C7 — Agent Factory: mints [`WorkerRole`]s from a static [`RoleTemplate`]
//! catalog, scored against a set of required capabilities (spec section 4.5).

use std::collections::BTreeSet;

use crate::domain::models::{CapabilityCategory, ProviderProfile, RoleTemplate, WorkerRole};

/// Below this Jaccard+coverage score, fall back to the generic template.
const FALLBACK_THRESHOLD: f64 = 0.3;

pub struct AgentFactory {
    templates: Vec<RoleTemplate>,
    fallback: RoleTemplate,
}

impl AgentFactory {
    pub fn new(templates: Vec<RoleTemplate>) -> Self {
        let fallback = RoleTemplate::new(
            "versatile",
            "You are a versatile generalist. Handle whatever the task requires, \
             drawing on any provider made available to you.",
        )
        .with_personality_traits(["adaptable", "pragmatic"]);
        Self { templates, fallback }
    }

    /// Default catalog: researcher, analyst, creator, developer, automator,
    /// web-specialist, reasoner, coordinator, communicator (spec section 4.5).
    pub fn default_catalog() -> Vec<RoleTemplate> {
        use CapabilityCategory::*;
        vec![
            RoleTemplate::new("researcher", "Find, verify, and summarize information from available sources.")
                .with_capabilities([Search, Web])
                .with_personality_traits(["thorough", "skeptical of unverified claims"]),
            RoleTemplate::new("analyst", "Analyze data and surface patterns, anomalies, and conclusions.")
                .with_capabilities([Analysis, Database, DataProcessing])
                .with_personality_traits(["methodical", "precise with numbers"]),
            RoleTemplate::new("creator", "Produce polished written or visual content.")
                .with_capabilities([Graphics, Communication])
                .with_personality_traits(["creative", "attentive to tone"]),
            RoleTemplate::new("developer", "Write, review, and modify code.")
                .with_capabilities([Development, File])
                .with_personality_traits(["disciplined", "cautious about side effects"]),
            RoleTemplate::new("automator", "Automate repetitive multi-step workflows.")
                .with_capabilities([Automation, System])
                .with_personality_traits(["systematic", "impatient with manual steps"]),
            RoleTemplate::new("web-specialist", "Navigate and operate web applications on the user's behalf.")
                .with_capabilities([Web, Automation])
                .with_personality_traits(["observant", "deliberate about irreversible actions"]),
            RoleTemplate::new("reasoner", "Work through ambiguous or multi-step reasoning problems.")
                .with_capabilities([Reasoning, Cognitive])
                .with_personality_traits(["patient", "explicit about assumptions"]),
            RoleTemplate::new("coordinator", "Delegate to and synthesize results from other roles.")
                .with_capabilities([Reasoning, Communication])
                .with_personality_traits(["decisive", "fair in weighing input"]),
            RoleTemplate::new("communicator", "Draft and send messages through connected channels.")
                .with_capabilities([Communication])
                .with_personality_traits(["clear", "mindful of the recipient's time"]),
        ]
    }

    /// Score every template and build a role covering `capabilities`,
    /// extending its preferred providers with any additional providers in
    /// `registry` needed to cover a capability the template doesn't name.
    pub fn build_role(&self, capabilities: &BTreeSet<CapabilityCategory>, providers: &[ProviderProfile]) -> WorkerRole {
        let template = self.best_template(capabilities);

        let mut provider_names: Vec<String> = template
            .preferred_providers
            .iter()
            .map(|p| p.to_string())
            .filter(|name| providers.iter().any(|p| &p.name == name))
            .collect();

        for cap in capabilities {
            if provider_names
                .iter()
                .any(|name| providers.iter().find(|p| &p.name == name).is_some_and(|p| p.provides(*cap)))
            {
                continue;
            }
            if let Some(p) = providers.iter().find(|p| p.provides(*cap)) {
                if !provider_names.contains(&p.name) {
                    provider_names.push(p.name.clone());
                }
            }
        }

        let instruction = Self::compose_instruction(template, capabilities);

        WorkerRole::new(template.name, instruction)
            .with_providers(provider_names)
            .with_capabilities(capabilities.iter().copied())
    }

    /// `team_for`: group capabilities by category and mint one specialized
    /// role per group, up to `size` roles (spec section 4.5).
    pub fn team_for(&self, capabilities: &BTreeSet<CapabilityCategory>, size: usize, providers: &[ProviderProfile]) -> Vec<WorkerRole> {
        capabilities
            .iter()
            .take(size.max(1))
            .map(|cap| {
                let single: BTreeSet<CapabilityCategory> = [*cap].into_iter().collect();
                self.build_role(&single, providers)
            })
            .collect()
    }

    /// Names of every template in the catalog, for capability-summary
    /// reporting (spec section 6, `capabilities`).
    pub fn template_names(&self) -> Vec<&'static str> {
        self.templates.iter().map(|t| t.name).collect()
    }

    fn best_template(&self, required: &BTreeSet<CapabilityCategory>) -> &RoleTemplate {
        let mut best: Option<(&RoleTemplate, f64)> = None;
        for template in &self.templates {
            let score = Self::score_template(template, required);
            if best.as_ref().map(|(_, s)| score > *s).unwrap_or(true) {
                best = Some((template, score));
            }
        }
        match best {
            Some((template, score)) if score >= FALLBACK_THRESHOLD => template,
            _ => &self.fallback,
        }
    }

    fn score_template(template: &RoleTemplate, required: &BTreeSet<CapabilityCategory>) -> f64 {
        let preferred: BTreeSet<CapabilityCategory> = template.preferred_capabilities.iter().copied().collect();
        if preferred.is_empty() && required.is_empty() {
            return 1.0;
        }

        let intersection = preferred.intersection(required).count();
        let union = preferred.union(required).count().max(1);
        let jaccard = intersection as f64 / union as f64;

        let coverage = if required.is_empty() {
            0.0
        } else {
            intersection as f64 / required.len() as f64
        };

        0.7 * jaccard + 0.3 * coverage
    }

    fn compose_instruction(template: &RoleTemplate, capabilities: &BTreeSet<CapabilityCategory>) -> String {
        let cap_list: Vec<&str> = capabilities.iter().map(|c| c.as_str()).collect();
        let mut instruction = format!(
            "{} You have access to the following capabilities: {}. \
             Be precise, cite what you relied on, and say so plainly when you are unsure.",
            template.instruction,
            cap_list.join(", "),
        );

        if !template.personality_traits.is_empty() {
            instruction.push_str(&format!(
                " Carry yourself as: {}.",
                template.personality_traits.join(", "),
            ));
        }

        instruction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ProviderStatus;

    fn provider(name: &str, caps: &[CapabilityCategory]) -> ProviderProfile {
        ProviderProfile::new(name)
            .with_capabilities(caps.iter().copied())
            .with_status(ProviderStatus::Connected)
    }

    #[test]
    fn matching_template_wins_over_generic_fallback() {
        let factory = AgentFactory::new(AgentFactory::default_catalog());
        let caps: BTreeSet<_> = [CapabilityCategory::Development, CapabilityCategory::File].into_iter().collect();
        let providers = vec![provider("fs-tools", &[CapabilityCategory::File, CapabilityCategory::Development])];
        let role = factory.build_role(&caps, &providers);
        assert_eq!(role.name, "developer");
        assert!(role.provider_names.contains(&"fs-tools".to_string()));
    }

    #[test]
    fn instruction_appends_capability_and_personality_phrases_deterministically() {
        let factory = AgentFactory::new(AgentFactory::default_catalog());
        let caps: BTreeSet<_> = [CapabilityCategory::Development, CapabilityCategory::File].into_iter().collect();
        let providers = vec![provider("fs-tools", &[CapabilityCategory::File, CapabilityCategory::Development])];

        let first = factory.build_role(&caps, &providers).instructions;
        let second = factory.build_role(&caps, &providers).instructions;
        assert_eq!(first, second);
        assert!(first.contains("You have access to the following capabilities"));
        assert!(first.contains("Carry yourself as: disciplined, cautious about side effects."));
    }

    #[test]
    fn unmatched_capability_falls_back_to_versatile() {
        let factory = AgentFactory::new(AgentFactory::default_catalog());
        let caps: BTreeSet<_> = BTreeSet::new();
        let role = factory.build_role(&caps, &[]);
        assert_eq!(role.name, "versatile");
    }

    #[test]
    fn team_for_caps_at_requested_size() {
        let factory = AgentFactory::new(AgentFactory::default_catalog());
        let caps: BTreeSet<_> = [
            CapabilityCategory::File,
            CapabilityCategory::Search,
            CapabilityCategory::Analysis,
        ]
        .into_iter()
        .collect();
        let team = factory.team_for(&caps, 2, &[]);
        assert_eq!(team.len(), 2);
    }
}
