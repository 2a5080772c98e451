//! PowerShell remote-session scripts.
//!
//! Both scripts open a `New-PSSession -VMName` against a Hyper-V guest with
//! a plain-text credential, do their work, and remove the session. The
//! positional layout `{vm, user, password, payload...}` and the single-quote
//! quoting are what the guest-side PowerShell expects and must not change.
//!
//! Credentials and paths are interpolated verbatim. A value containing `'`
//! ends the quoted string early and corrupts the script; callers that need
//! arbitrary passwords must vet them first.

/// Values substituted into a remote-session script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptParams<'a> {
    /// Hyper-V virtual machine name.
    pub target: &'a str,
    /// Guest user name.
    pub user: &'a str,
    /// Guest password, inserted unescaped.
    pub password: &'a str,
    /// The command (for [`enter_vm`]) or the source path (for [`copy_file`]).
    pub payload: &'a str,
}

/// Script that runs `params.payload` inside the guest.
///
/// Whatever the shell reads on stdin is forwarded to the guest command as
/// `-InputObject`, which is how module input reaches a pipelined module.
pub fn enter_vm(params: &ScriptParams<'_>) -> String {
    format!(
        r#"
# $WarningPreference = 'SilentlyContinue'
$secpass = ConvertTo-SecureString -AsPlainText -Force -String '{password}'
$cred = [PSCredential]::new('{user}', $secpass)
$exec_wrapper_str = $input | Out-String
$cmd = [ScriptBlock]::Create(@'
{command}
'@)
$s = New-PSSession -VMName '{vm}' -Credential $cred
Invoke-Command -Session $s -InputObject $exec_wrapper_str -ScriptBlock $cmd
$s | Remove-PSSession
"#,
        vm = params.target,
        user = params.user,
        password = params.password,
        command = params.payload,
    )
}

/// Script that copies the host file `params.payload` to `destination` in
/// the guest.
pub fn copy_file(params: &ScriptParams<'_>, destination: &str) -> String {
    format!(
        r#"
$secpass = ConvertTo-SecureString -AsPlainText -Force -String '{password}'
$cred = [PSCredential]::new('{user}', $secpass)
$s = New-PSSession -VMName '{vm}' -Credential $cred
Copy-Item -ToSession $s -Path '{source}' -Destination '{destination}'
$s | Remove-PSSession
"#,
        vm = params.target,
        user = params.user,
        password = params.password,
        source = params.payload,
        destination = destination,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params<'a>(payload: &'a str) -> ScriptParams<'a> {
        ScriptParams {
            target: "myvm",
            user: "bob",
            password: "pw",
            payload,
        }
    }

    fn position(haystack: &str, needle: &str) -> usize {
        haystack
            .find(needle)
            .unwrap_or_else(|| panic!("{needle:?} not found in script"))
    }

    #[test]
    fn test_enter_vm_contains_all_values() {
        let script = enter_vm(&params("dir"));

        assert!(script.contains("-VMName 'myvm'"));
        assert!(script.contains("[PSCredential]::new('bob', $secpass)"));
        assert!(script.contains("-String 'pw'"));
        assert!(script.contains("@'\ndir\n'@"));
    }

    #[test]
    fn test_enter_vm_credential_precedes_command() {
        let script = enter_vm(&params("dir"));
        // Credential is built before the script block, which is built
        // before the session opens.
        assert!(position(&script, "'pw'") < position(&script, "'bob'"));
        assert!(position(&script, "'bob'") < position(&script, "\ndir\n"));
        assert!(position(&script, "\ndir\n") < position(&script, "'myvm'"));
    }

    #[test]
    fn test_enter_vm_multiline_command_verbatim() {
        let command = "$a = 1\r\nWrite-Output $a";
        let script = enter_vm(&params(command));
        assert!(script.contains(command));
    }

    #[test]
    fn test_copy_file_paths() {
        let script = copy_file(&params(r"C:\tmp\module.ps1"), r"C:\Users\bob\module.ps1");

        assert!(script.contains(
            r"Copy-Item -ToSession $s -Path 'C:\tmp\module.ps1' -Destination 'C:\Users\bob\module.ps1'"
        ));
        assert!(script.contains("-VMName 'myvm'"));
        assert!(script.ends_with("$s | Remove-PSSession\n"));
    }

    #[test]
    fn test_password_is_not_escaped() {
        let script = enter_vm(&ScriptParams {
            password: "it's",
            ..params("dir")
        });
        assert!(script.contains("-String 'it's'"));
    }
}
