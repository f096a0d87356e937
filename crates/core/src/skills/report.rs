//! # Report
//!
//! The structured sustainability report and its fixed Markdown layout.

use crate::errors::PipelineError;
use crate::skills::agent_definitions::TaskDescriptor;
use crate::state::ResultMap;
use radkit::macros::LLMOutput;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Top-level report title
pub const REPORT_TITLE: &str = "Summary of Recent Sustainable Technology Advancements";

/// Heading of the closing section
pub const CONCLUSION_HEADING: &str = "Overall Conclusion";

/// Findings for one research slot, as written by the synthesis model
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct SectionDraft {
    /// Slot key of the research input, exactly as listed in the prompt
    /// (e.g. "renewable_energy_result")
    pub slot: String,
    /// Synthesized findings for that input
    pub findings: String,
}

/// Structured output of the synthesis model
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, LLMOutput)]
pub struct ReportDraft {
    /// One entry per research input
    pub sections: Vec<SectionDraft>,
    /// 1-2 sentence overall conclusion
    pub conclusion: String,
}

impl SectionDraft {
    /// True when this draft section belongs to `task`
    pub fn targets(&self, task: &TaskDescriptor) -> bool {
        let key = self.slot.trim();
        key == task.output_key || key.eq_ignore_ascii_case(task.heading)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub title: String,
    pub sections: Vec<ReportSection>,
    pub conclusion: String,
}

impl Report {
    /// Report quoting each slot verbatim under its task's heading
    pub fn from_slots(
        tasks: &[TaskDescriptor],
        slots: &ResultMap,
        conclusion: impl Into<String>,
    ) -> Result<Self, PipelineError> {
        let sections = tasks
            .iter()
            .map(|task| {
                let body = slot_value(slots, task.output_key)?;
                Ok(ReportSection {
                    heading: task.heading.to_string(),
                    body: body.to_string(),
                })
            })
            .collect::<Result<Vec<_>, PipelineError>>()?;

        Ok(Self {
            title: REPORT_TITLE.to_string(),
            sections,
            conclusion: conclusion.into(),
        })
    }

    /// Report from a model draft, in task order regardless of draft order.
    ///
    /// A drafted section is keyed by its slot or its report heading. A section
    /// the draft omits or leaves blank falls back to the raw slot text.
    pub fn assemble(
        tasks: &[TaskDescriptor],
        draft: &ReportDraft,
        slots: &ResultMap,
    ) -> Result<Self, PipelineError> {
        let sections = tasks
            .iter()
            .map(|task| {
                let drafted = draft
                    .sections
                    .iter()
                    .find(|s| s.targets(task) && !s.findings.trim().is_empty())
                    .map(|s| s.findings.clone());
                let body = match drafted {
                    Some(findings) => findings,
                    None => {
                        tracing::warn!(slot = task.output_key, "Draft omitted section, using raw findings");
                        slot_value(slots, task.output_key)?.to_string()
                    }
                };
                Ok(ReportSection {
                    heading: task.heading.to_string(),
                    body,
                })
            })
            .collect::<Result<Vec<_>, PipelineError>>()?;

        Ok(Self {
            title: REPORT_TITLE.to_string(),
            sections,
            conclusion: draft.conclusion.clone(),
        })
    }

    /// Render with the fixed heading order
    pub fn to_markdown(&self) -> String {
        let mut out = format!("## {}\n", self.title);
        for section in &self.sections {
            out.push_str(&format!("\n### {}\n{}\n", section.heading, section.body.trim()));
        }
        out.push_str(&format!(
            "\n### {}\n{}\n",
            CONCLUSION_HEADING,
            self.conclusion.trim()
        ));
        out
    }
}

fn slot_value<'a>(slots: &'a ResultMap, slot: &str) -> Result<&'a str, PipelineError> {
    slots.get(slot).ok_or_else(|| PipelineError::MissingSlot {
        slot: slot.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::agent_definitions::default_research_tasks;

    fn slots() -> ResultMap {
        [
            ("renewable_energy_result", "A"),
            ("ev_technology_result", "B"),
            ("carbon_capture_result", "C"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_markdown_heading_order() {
        let report = Report::from_slots(&default_research_tasks(), &slots(), "Done.").unwrap();
        let md = report.to_markdown();
        let positions: Vec<usize> = [
            "## Summary of Recent Sustainable Technology Advancements",
            "### Renewable Energy Findings\nA\n",
            "### Electric Vehicle Findings\nB\n",
            "### Carbon Capture Findings\nC\n",
            "### Overall Conclusion\nDone.\n",
        ]
        .iter()
        .map(|needle| md.find(needle).unwrap_or_else(|| panic!("missing {:?}", needle)))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_assemble_reorders_and_fills_gaps() {
        let draft = ReportDraft {
            sections: vec![
                SectionDraft {
                    slot: "carbon_capture_result".to_string(),
                    findings: "Capture improved.".to_string(),
                },
                SectionDraft {
                    slot: "renewable_energy_result".to_string(),
                    findings: "Solar grew.".to_string(),
                },
            ],
            conclusion: "Progress everywhere.".to_string(),
        };
        let report = Report::assemble(&default_research_tasks(), &draft, &slots()).unwrap();
        let bodies: Vec<_> = report.sections.iter().map(|s| s.body.as_str()).collect();
        assert_eq!(bodies, vec!["Solar grew.", "B", "Capture improved."]);
        assert_eq!(report.conclusion, "Progress everywhere.");
    }

    #[test]
    fn test_assemble_accepts_heading_as_key() {
        let draft = ReportDraft {
            sections: vec![SectionDraft {
                slot: " electric vehicle findings".to_string(),
                findings: "Sodium-ion packs entered production.".to_string(),
            }],
            conclusion: "Steady.".to_string(),
        };
        let report = Report::assemble(&default_research_tasks(), &draft, &slots()).unwrap();
        assert_eq!(report.sections[1].body, "Sodium-ion packs entered production.");
        assert_eq!(report.sections[0].body, "A");
    }

    #[test]
    fn test_unrelated_key_does_not_match() {
        let section = SectionDraft {
            slot: "Renewable Energy".to_string(),
            findings: "x".to_string(),
        };
        assert!(!default_research_tasks().iter().any(|t| section.targets(t)));
    }

    #[test]
    fn test_missing_slot_fails_closed() {
        let partial: ResultMap = [("renewable_energy_result", "A")].into_iter().collect();
        match Report::from_slots(&default_research_tasks(), &partial, "") {
            Err(PipelineError::MissingSlot { slot }) => assert_eq!(slot, "ev_technology_result"),
            other => panic!("expected missing slot, got {:?}", other),
        }
    }
}
