// descriptor.rs - HTCondor submit description for a sweep

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DESCRIPTOR_NAME: &str = "condor_script.sub";

/// CERN batch job flavours (maximum wall time in the comment).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobFlavour {
    Espresso,     // 20 minutes
    Microcentury, // 1 hour
    Longlunch,    // 2 hours
    Workday,      // 8 hours
    Tomorrow,     // 1 day
    Testmatch,    // 3 days
    Nextweek,     // 1 week
}

impl JobFlavour {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobFlavour::Espresso     => "espresso",
            JobFlavour::Microcentury => "microcentury",
            JobFlavour::Longlunch    => "longlunch",
            JobFlavour::Workday      => "workday",
            JobFlavour::Tomorrow     => "tomorrow",
            JobFlavour::Testmatch    => "testmatch",
            JobFlavour::Nextweek     => "nextweek",
        }
    }
}

impl fmt::Display for JobFlavour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How many instances the scheduler starts and how each finds its job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueRule {
    /// `queue N`; instance `$(ProcId)` runs its chunk of the argument table.
    Count(usize),
    /// `queue filename matching files <pattern>`; one instance per script.
    /// `matched` is the number of scripts written for the glob.
    Matching { pattern: String, matched: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchDescriptor {
    pub executable:           String,
    pub arguments:            Option<String>,
    pub transfer_input_files: Vec<String>,
    pub job_flavour:          Option<JobFlavour>,
    pub accounting_group:     Option<String>,
    pub queue:                QueueRule,
}

impl BatchDescriptor {
    pub fn instance_count(&self) -> usize {
        match &self.queue {
            QueueRule::Count(n) => *n,
            QueueRule::Matching { matched, .. } => *matched,
        }
    }

    /// Submit-file text. Log files are per cluster and process.
    pub fn render(&self) -> String {
        let mut lines = vec![format!("executable = {}", self.executable)];
        if let Some(args) = &self.arguments {
            lines.push(format!("arguments = {args}"));
        }
        lines.push("output = output.$(ClusterId).$(ProcId).out".into());
        lines.push("error = error.$(ClusterId).$(ProcId).err".into());
        lines.push("log = log.$(ClusterId).log".into());
        if !self.transfer_input_files.is_empty() {
            lines.push("should_transfer_files = YES".into());
            lines.push(format!("transfer_input_files = {}", self.transfer_input_files.join(",")));
            lines.push("transfer_output_files = \"\"".into());
        }
        if let Some(flavour) = self.job_flavour {
            lines.push(format!("+JobFlavour = \"{flavour}\""));
        }
        if let Some(group) = &self.accounting_group {
            lines.push(format!("+AccountingGroup = \"{group}\""));
        }
        lines.push(match &self.queue {
            QueueRule::Count(n) => format!("queue {n}"),
            QueueRule::Matching { pattern, .. } => format!("queue filename matching files {pattern}"),
        });

        let mut text = lines.join("\n");
        text.push('\n');
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexed_descriptor() {
        let d = BatchDescriptor {
            executable:           "run_job.sh".into(),
            arguments:            Some("$(ProcId)".into()),
            transfer_input_files: vec!["/home/a/steer.py".into(), "/jobs/arguments.txt".into()],
            job_flavour:          Some(JobFlavour::Longlunch),
            accounting_group:     None,
            queue:                QueueRule::Count(6),
        };
        let text = d.render();
        assert_eq!(d.instance_count(), 6);
        assert!(text.starts_with("executable = run_job.sh\narguments = $(ProcId)\n"));
        assert!(text.contains("transfer_input_files = /home/a/steer.py,/jobs/arguments.txt\n"));
        assert!(text.contains("+JobFlavour = \"longlunch\"\n"));
        assert!(!text.contains("AccountingGroup"));
        assert!(text.ends_with("queue 6\n"));
    }

    #[test]
    fn glob_descriptor_without_transfers() {
        let d = BatchDescriptor {
            executable:           "$(filename)".into(),
            arguments:            None,
            transfer_input_files: vec![],
            job_flavour:          None,
            accounting_group:     Some("group_u_FCC.local_gen".into()),
            queue:                QueueRule::Matching { pattern: "*.sh".into(), matched: 4 },
        };
        let text = d.render();
        assert_eq!(d.instance_count(), 4);
        assert!(!text.contains("arguments"));
        assert!(!text.contains("should_transfer_files"));
        assert!(text.ends_with("queue filename matching files *.sh\n"));
    }
}
