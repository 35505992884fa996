// transfer.rs - How a finished artifact reaches durable storage
//
// Each strategy renders a block of bash that expects `$local_output` and
// `$final_output` to be set. It retries once with verbose options, stamps a
// timestamp marker next to the artifact, and calls `report_faulty_node` if
// the artifact still is not where it should be.

use std::fmt::Write as _;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transfer {
    /// `cp` to a locally mounted directory.
    Copy,
    /// `mv` to a locally mounted directory.
    Move,
    /// `xrdcp` to an XRootD/EOS endpoint, e.g. `root://eosuser.cern.ch`.
    Xrootd { entry_point: String },
}

impl Transfer {
    /// Whether the destination lives on this host's filesystem.
    pub fn is_local(&self) -> bool {
        !matches!(self, Transfer::Xrootd { .. })
    }

    pub fn describe(&self) -> String {
        match self {
            Transfer::Copy => "cp".into(),
            Transfer::Move => "mv".into(),
            Transfer::Xrootd { entry_point } => format!("xrdcp via {entry_point}"),
        }
    }

    /// Bash that moves the artifact and stamps `<artifact>.<marker_suffix>`.
    pub fn render(&self, marker_suffix: &str) -> String {
        let mut s = String::new();
        match self {
            Transfer::Copy | Transfer::Move => {
                let cmd = if *self == Transfer::Copy { "cp" } else { "mv" };
                let _ = writeln!(s, "if ! {cmd} \"$local_output\" \"$final_output\"; then");
                let _ = writeln!(s, "    echo \"{cmd} failed, retrying verbosely\" >&2");
                let _ = writeln!(s, "    {cmd} -v \"$local_output\" \"$final_output\"");
                let _ = writeln!(s, "fi");
                let _ = writeln!(s, "if [ -f \"$final_output\" ]; then");
                let _ = writeln!(s, "    date > \"$final_output.{marker_suffix}\"");
                let _ = writeln!(s, "else");
                let _ = writeln!(s, "    report_faulty_node");
                let _ = writeln!(s, "fi");
            }
            Transfer::Xrootd { entry_point } => {
                let remote = format!("{entry_point}/$final_output");
                let probe = format!("$(eos {entry_point} ls \"$final_output\" 2>/dev/null)");
                let _ = writeln!(s, "export EOS_MGM_URL={entry_point}");
                let _ = writeln!(s, "xrdcp --nopbar --path \"$local_output\" \"{remote}\"");
                let _ = writeln!(s, "if [ -z \"{probe}\" ]; then");
                let _ = writeln!(s, "    echo \"xrdcp failed, retrying verbosely\" >&2");
                let _ = writeln!(s, "    xrdcp -v --debug 2 --retry 5 --cksum md5 --nopbar --force --path \"$local_output\" \"{remote}\"");
                let _ = writeln!(s, "fi");
                let _ = writeln!(s, "if [ -n \"{probe}\" ]; then");
                let _ = writeln!(s, "    date > \"$local_output.{marker_suffix}\"");
                let _ = writeln!(s, "    xrdcp --nopbar --force \"$local_output.{marker_suffix}\" \"{remote}.{marker_suffix}\"");
                let _ = writeln!(s, "else");
                let _ = writeln!(s, "    report_faulty_node");
                let _ = writeln!(s, "fi");
            }
        }
        s
    }
}

/// Bash function recording where a transfer failed, for later forensics.
pub fn failure_hook(diagnostics_dir: &Path) -> String {
    let dir = diagnostics_dir.display();
    let mut s = String::new();
    let _ = writeln!(s, "report_faulty_node() {{");
    let _ = writeln!(s, "    mkdir -p {dir}");
    let _ = writeln!(s, "    {{");
    let _ = writeln!(s, "        echo \"${{0##*/}} $(date)\"");
    let _ = writeln!(s, "        hostname");
    let _ = writeln!(s, "        ifconfig 2>/dev/null || ip addr");
    let _ = writeln!(s, "    }} >> {dir}/faulty_node.txt");
    let _ = writeln!(s, "    cp \"$0\" {dir}/");
    let _ = writeln!(s, "    exit 1");
    let _ = writeln!(s, "}}");
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_copy_retries_then_stamps_marker() {
        let sh = Transfer::Copy.render("kk");
        assert!(sh.contains("if ! cp \"$local_output\" \"$final_output\"; then"));
        assert!(sh.contains("cp -v \"$local_output\" \"$final_output\""));
        assert!(sh.contains("date > \"$final_output.kk\""));
        assert!(sh.contains("report_faulty_node"));
    }

    #[test]
    fn xrootd_checks_destination_before_and_after_retry() {
        let t = Transfer::Xrootd { entry_point: "root://eosuser.cern.ch".into() };
        let sh = t.render("kk");
        assert!(sh.starts_with("export EOS_MGM_URL=root://eosuser.cern.ch\n"));
        assert_eq!(sh.matches("eos root://eosuser.cern.ch ls \"$final_output\"").count(), 2);
        assert!(sh.contains("--retry 5 --cksum md5"));
        assert!(sh.contains("\"root://eosuser.cern.ch/$final_output.kk\""));
        assert!(!t.is_local());
    }

    #[test]
    fn hook_writes_to_diagnostics_dir() {
        let sh = failure_hook(Path::new("/afs/user/Public"));
        assert!(sh.contains(">> /afs/user/Public/faulty_node.txt"));
        assert!(sh.contains("cp \"$0\" /afs/user/Public/"));
    }
}
