//! Usage banner for a bare invocation

const EXAMPLES: &str = "\
llxc - lifecycle management for LXC containers

Examples:
  llxc list                      all containers with tasks, state and address
  llxc status web1               one container in detail (add --json for scripts)
  llxc create web1               create from the template, autostart, start
  llxc clone web1 web2           copy web1 to a new container web2
  llxc start web1                start (also: stop, kill, freeze, unfreeze)
  llxc toggleautostart web1      flip start-at-boot
  llxc archive web1              stop, compress, and remove from the live set
  llxc unarchive web1            restore an archived container (not started)
  llxc archived                  list archived containers
  llxc startall                  start every stopped container
  llxc haltall                   gracefully stop every running container
  llxc gensshkeys                create the host SSH keypair
  llxc distkeys                  trust the host key in every container
  llxc enter web1                SSH into a container
  llxc exec web1 -- uptime       run one command over SSH

Tips:
  Mutating commands need root; status, list and archived do not.
  -i/--interface and --ipstack choose which address list and status show.
  Configuration lives in /etc/llxc/llxc.conf (or $LLXC_CONFIG).
  Run 'llxc help <command>' for the options of a command.
";

pub fn examples() {
    print!("{}", EXAMPLES);
}
