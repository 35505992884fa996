// script.rs - Bash wrappers around the simulation executable
//
// Both wrapper kinds source the software stack once and define `run_one`,
// which runs the simulation with `$sim_args` and hands the artifact to the
// transfer block. They differ only in where `local_output`, `final_output`
// and `sim_args` come from, and each may run several jobs in a row.

use crate::config::ResolvedConfig;
use crate::record::JobRecord;
use crate::transfer::failure_hook;
use std::fmt::Write as _;

pub const RUNNER_NAME: &str = "run_job.sh";
pub const PER_JOB_PATTERN: &str = "*.sh";

/// `run_job.sh <instance>`: runs table lines `instance*k .. (instance+1)*k`
/// (0-based, clipped to the table), `k` being the jobs per instance.
pub fn table_runner(cfg: &ResolvedConfig) -> String {
    let table = cfg.argument_table_reference();
    let per   = cfg.jobs_per_instance;
    let total = cfg.sweep.len();

    let mut s = header(cfg);
    let _ = writeln!(s, "if [ $# -ne 1 ]; then");
    let _ = writeln!(s, "    echo \"usage: ${{0##*/}} <instance index>\" >&2");
    let _ = writeln!(s, "    exit 2");
    let _ = writeln!(s, "fi");
    let _ = writeln!(s, "case $1 in");
    let _ = writeln!(s, "    ''|*[!0-9]*)");
    let _ = writeln!(s, "        echo \"instance index must be a non-negative integer, got '$1'\" >&2");
    let _ = writeln!(s, "        exit 2;;");
    let _ = writeln!(s, "esac");
    let _ = writeln!(s, "first=$(( 10#$1 * {per} ))");
    let _ = writeln!(s, "last=$(( first + {per} ))");
    let _ = writeln!(s, "if [ $last -gt {total} ]; then last={total}; fi");
    let _ = writeln!(s, "if [ $first -ge $last ]; then");
    let _ = writeln!(s, "    echo \"no entry for instance $1 in {table}\" >&2");
    let _ = writeln!(s, "    exit 2");
    let _ = writeln!(s, "fi");
    s.push_str(&prologue(cfg));
    let _ = writeln!(s);
    let _ = writeln!(s, "for (( job = first; job < last; job++ )); do");
    let _ = writeln!(s, "    line=$(sed -n \"$(( job + 1 ))p\" {table})");
    let _ = writeln!(s, "    if [ -z \"$line\" ]; then");
    let _ = writeln!(s, "        echo \"no entry for job $job in {table}\" >&2");
    let _ = writeln!(s, "        exit 2");
    let _ = writeln!(s, "    fi");
    let _ = writeln!(s, "    read -r local_output final_output sim_args <<< \"$line\"");
    let _ = writeln!(s, "    run_one");
    let _ = writeln!(s, "done");
    s
}

/// Standalone wrapper for one chunk of jobs, arguments baked in.
pub fn per_job_script(cfg: &ResolvedConfig, records: &[JobRecord]) -> String {
    let mut s = header(cfg);
    s.push_str(&prologue(cfg));
    for record in records {
        let _ = writeln!(s);
        let _ = writeln!(s, "# job {}: {}", record.index, record.spec);
        let _ = writeln!(s, "local_output={}", record.local_output);
        let _ = writeln!(s, "final_output={}", record.final_output);
        let _ = writeln!(s, "sim_args=\"{}\"", record.argument_string());
        let _ = writeln!(s, "run_one");
    }
    s
}

/// File name of a per-job wrapper: the job's own stem with one job per
/// instance, the chunk number otherwise.
pub fn per_job_script_name(cfg: &ResolvedConfig, chunk: usize, records: &[JobRecord]) -> String {
    match records {
        [single] if cfg.jobs_per_instance == 1 => single.script_name(),
        _ => format!("chunk_{chunk:05}.sh"),
    }
}

fn header(cfg: &ResolvedConfig) -> String {
    let mut s = String::from("#!/bin/bash\n");
    s.push_str(&failure_hook(&cfg.diagnostics_dir));
    s.push('\n');
    s
}

/// Stack setup plus the `run_one` function.
fn prologue(cfg: &ResolvedConfig) -> String {
    let exe = &cfg.executable;
    let mut body = String::new();
    let _ = writeln!(body, "echo \"{exe} args: $sim_args\"");
    let _ = writeln!(body, "echo \"{exe} starts simulation...\"");
    let _ = writeln!(body, "date");
    let _ = writeln!(body, "{exe} $sim_args");
    let _ = writeln!(body, "status=$?");
    let _ = writeln!(body, "date");
    let _ = writeln!(body, "echo \"{exe} finished with status $status\"");
    let _ = writeln!(body, "if [ $status -ne 0 ]; then");
    let _ = writeln!(body, "    echo \"{exe} failed, not transferring $local_output\" >&2");
    let _ = writeln!(body, "    report_faulty_node");
    let _ = writeln!(body, "fi");
    body.push_str(&cfg.transfer.render(&cfg.marker_suffix));

    let mut s = String::new();
    let _ = writeln!(s, "source {}", cfg.setup_script);
    let _ = writeln!(s);
    let _ = writeln!(s, "run_one() {{");
    for line in body.lines() {
        let _ = writeln!(s, "    {line}");
    }
    let _ = writeln!(s, "}}");
    s
}
