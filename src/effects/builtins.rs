//! Built-in effect table seeding the registry.
//!
//! The table covers the standard surface analyzed programs touch. Side
//! entries carry themselves as payload so reports name the bottommost
//! operation; wrappers that delegate declare a resolution chain.

use once_cell::sync::Lazy;

use super::{CompactEffect, ExceptionType, Mfa, RegistryEntry};

/// Operations with no observable behavior.
const PURE: &[&str] = &[
    // Kernel arithmetic and comparisons
    "Kernel.+/2",
    "Kernel.-/2",
    "Kernel.-/1",
    "Kernel.*/2",
    "Kernel.//2",
    "Kernel.abs/1",
    "Kernel.min/2",
    "Kernel.max/2",
    "Kernel.rem/2",
    "Kernel.trunc/1",
    "Kernel.round/1",
    "Kernel.==/2",
    "Kernel.!=/2",
    "Kernel.===/2",
    "Kernel.!==/2",
    "Kernel.</2",
    "Kernel.>/2",
    "Kernel.<=/2",
    "Kernel.>=/2",
    "Kernel.and/2",
    "Kernel.or/2",
    "Kernel.not/1",
    "Kernel.&&/2",
    "Kernel.||/2",
    "Kernel.!/1",
    "Kernel.++/2",
    "Kernel.--/2",
    "Kernel.<>/2",
    "Kernel.length/1",
    "Kernel.hd/1",
    "Kernel.tl/1",
    "Kernel.elem/2",
    "Kernel.put_elem/3",
    "Kernel.tuple_size/1",
    "Kernel.map_size/1",
    "Kernel.is_atom/1",
    "Kernel.is_binary/1",
    "Kernel.is_boolean/1",
    "Kernel.is_float/1",
    "Kernel.is_function/1",
    "Kernel.is_function/2",
    "Kernel.is_integer/1",
    "Kernel.is_list/1",
    "Kernel.is_map/1",
    "Kernel.is_nil/1",
    "Kernel.is_number/1",
    "Kernel.is_pid/1",
    "Kernel.is_reference/1",
    "Kernel.is_tuple/1",
    "Kernel.to_string/1",
    "Kernel.inspect/1",
    "Kernel.inspect/2",
    "Function.identity/1",
    // List
    "List.first/1",
    "List.last/1",
    "List.flatten/1",
    "List.wrap/1",
    "List.delete/2",
    "List.delete_at/2",
    "List.insert_at/3",
    "List.replace_at/3",
    "List.update_at/3",
    "List.zip/1",
    "List.to_tuple/1",
    "List.duplicate/2",
    "List.keyfind/3",
    "List.keymember?/3",
    "List.keyreplace/4",
    "List.keysort/2",
    "List.starts_with?/2",
    // Map
    "Map.new/0",
    "Map.new/1",
    "Map.get/2",
    "Map.get/3",
    "Map.fetch/2",
    "Map.put/3",
    "Map.put_new/3",
    "Map.delete/2",
    "Map.merge/2",
    "Map.keys/1",
    "Map.values/1",
    "Map.has_key?/2",
    "Map.take/2",
    "Map.drop/2",
    "Map.to_list/1",
    "Map.split/2",
    "Map.equal?/2",
    "Map.pop/2",
    "Map.pop/3",
    // MapSet
    "MapSet.new/0",
    "MapSet.new/1",
    "MapSet.put/2",
    "MapSet.delete/2",
    "MapSet.member?/2",
    "MapSet.union/2",
    "MapSet.difference/2",
    "MapSet.intersection/2",
    "MapSet.subset?/2",
    "MapSet.disjoint?/2",
    "MapSet.equal?/2",
    "MapSet.to_list/1",
    "MapSet.size/1",
    // Keyword
    "Keyword.get/2",
    "Keyword.get/3",
    "Keyword.fetch/2",
    "Keyword.put/3",
    "Keyword.delete/2",
    "Keyword.merge/2",
    "Keyword.keys/1",
    "Keyword.values/1",
    "Keyword.has_key?/2",
    "Keyword.keyword?/1",
    "Keyword.take/2",
    "Keyword.drop/2",
    // Tuple
    "Tuple.to_list/1",
    "Tuple.append/2",
    "Tuple.insert_at/3",
    "Tuple.delete_at/2",
    "Tuple.duplicate/2",
    // String
    "String.length/1",
    "String.upcase/1",
    "String.downcase/1",
    "String.capitalize/1",
    "String.split/1",
    "String.split/2",
    "String.trim/1",
    "String.trim_leading/1",
    "String.trim_trailing/1",
    "String.replace/3",
    "String.contains?/2",
    "String.starts_with?/2",
    "String.ends_with?/2",
    "String.slice/2",
    "String.slice/3",
    "String.at/2",
    "String.reverse/1",
    "String.duplicate/2",
    "String.pad_leading/2",
    "String.pad_trailing/2",
    "String.graphemes/1",
    "String.codepoints/1",
    "String.to_charlist/1",
    "String.valid?/1",
    "String.jaro_distance/2",
    "String.first/1",
    "String.last/1",
    // Integer / Float
    "Integer.parse/1",
    "Integer.parse/2",
    "Integer.to_string/1",
    "Integer.to_string/2",
    "Integer.digits/1",
    "Integer.undigits/1",
    "Integer.pow/2",
    "Integer.gcd/2",
    "Integer.mod/2",
    "Integer.floor_div/2",
    "Float.parse/1",
    "Float.round/2",
    "Float.ceil/1",
    "Float.floor/1",
    "Float.to_string/1",
    // Range
    "Range.new/2",
    "Range.new/3",
    "Range.disjoint?/2",
    "Range.size/1",
    // Date/time construction and arithmetic on given values
    "Date.add/2",
    "Date.diff/2",
    "Date.compare/2",
    "DateTime.add/3",
    "DateTime.compare/2",
    "DateTime.diff/2",
    "DateTime.from_iso8601/1",
    "DateTime.to_iso8601/1",
    "DateTime.to_unix/1",
    "Time.add/3",
    "Time.compare/2",
    "NaiveDateTime.add/3",
    "NaiveDateTime.compare/2",
    // URI and erlang term plumbing
    "URI.parse/1",
    "URI.encode/1",
    "URI.decode/1",
    ":erlang.term_to_binary/1",
    ":erlang.phash2/1",
    ":erlang.phash2/2",
    ":erlang.tuple_to_list/1",
    ":erlang.list_to_tuple/1",
    ":erlang.byte_size/1",
    ":erlang.bit_size/1",
    ":erlang.iolist_to_binary/1",
    // JSON-ish encoding living outside the registry proper
    "Base.encode16/1",
    "Base.encode64/1",
    "Base.decode64/1",
    "Base.url_encode64/1",
    // Enumerable protocol implementations
    "Enumerable.List.reduce/3",
    "Enumerable.List.count/1",
    "Enumerable.List.member?/2",
    "Enumerable.List.slice/1",
    "Enumerable.Map.reduce/3",
    "Enumerable.Map.count/1",
    "Enumerable.Map.member?/2",
    "Enumerable.Map.slice/1",
    "Enumerable.MapSet.reduce/3",
    "Enumerable.MapSet.count/1",
    "Enumerable.MapSet.member?/2",
    "Enumerable.MapSet.slice/1",
    "Enumerable.Range.reduce/3",
    "Enumerable.Range.count/1",
    "Enumerable.Range.member?/2",
    "Enumerable.Range.slice/1",
    // Collectable protocol implementations
    "Collectable.List.into/1",
    "Collectable.Map.into/1",
    "Collectable.MapSet.into/1",
    "Collectable.BitString.into/1",
    // String.Chars protocol implementations
    "String.Chars.Integer.to_string/1",
    "String.Chars.Float.to_string/1",
    "String.Chars.Atom.to_string/1",
    "String.Chars.BitString.to_string/1",
    "String.Chars.List.to_string/1",
    // Inspect protocol implementations
    "Inspect.Integer.inspect/2",
    "Inspect.Float.inspect/2",
    "Inspect.Atom.inspect/2",
    "Inspect.BitString.inspect/2",
    "Inspect.List.inspect/2",
    "Inspect.Map.inspect/2",
    "Inspect.MapSet.inspect/2",
    "Inspect.Range.inspect/2",
    // Path manipulation is pure; touching the filesystem is not
    "Path.join/1",
    "Path.join/2",
    "Path.expand/1",
    "Path.basename/1",
    "Path.dirname/1",
    "Path.extname/1",
    "Path.rootname/1",
    "Path.split/1",
    "Path.type/1",
];

/// Higher-order operations whose effect is the effect of their function
/// arguments.
const LAMBDA: &[&str] = &[
    "Enum.map/2",
    "Enum.each/2",
    "Enum.filter/2",
    "Enum.reject/2",
    "Enum.reduce/2",
    "Enum.reduce/3",
    "Enum.reduce_while/3",
    "Enum.flat_map/2",
    "Enum.find/2",
    "Enum.find_index/2",
    "Enum.find_value/2",
    "Enum.all?/2",
    "Enum.any?/2",
    "Enum.count/2",
    "Enum.sort_by/2",
    "Enum.min_by/2",
    "Enum.max_by/2",
    "Enum.group_by/2",
    "Enum.uniq_by/2",
    "Enum.take_while/2",
    "Enum.drop_while/2",
    "Enum.split_with/2",
    "Enum.map_join/3",
    "Enum.map_reduce/3",
    "Enum.zip_with/3",
    "Enum.with_index/2",
    "Enum.into/3",
    "List.foldl/3",
    "List.foldr/3",
    "Map.update/4",
    "Map.get_lazy/3",
    "Map.put_new_lazy/3",
    "Map.map/2",
    "Map.filter/2",
    "Map.reject/2",
    "MapSet.filter/2",
    "MapSet.reject/2",
    "Keyword.update/4",
    "Keyword.get_lazy/3",
    "Kernel.then/2",
    "Kernel.tap/2",
    "Stream.map/2",
    "Stream.each/2",
    "Stream.filter/2",
    "Stream.flat_map/2",
    "Stream.take_while/2",
    "Stream.drop_while/2",
];

/// Enum operations without function parameters; pure over pure
/// enumerables.
const ENUM_PURE: &[&str] = &[
    "Enum.count/1",
    "Enum.member?/2",
    "Enum.at/2",
    "Enum.at/3",
    "Enum.fetch/2",
    "Enum.sort/1",
    "Enum.sort/2",
    "Enum.reverse/1",
    "Enum.join/1",
    "Enum.join/2",
    "Enum.sum/1",
    "Enum.product/1",
    "Enum.zip/2",
    "Enum.unzip/1",
    "Enum.uniq/1",
    "Enum.take/2",
    "Enum.drop/2",
    "Enum.chunk_every/2",
    "Enum.concat/1",
    "Enum.concat/2",
    "Enum.into/2",
    "Enum.to_list/1",
    "Enum.with_index/1",
    "Enum.frequencies/1",
    "Enum.dedup/1",
    "Enum.empty?/1",
    "Enum.slice/3",
    "Enum.split/2",
];

/// Reads of the ambient environment: time, env vars, scheduler state,
/// process identity.
const DEPENDENT: &[&str] = &[
    "DateTime.utc_now/0",
    "DateTime.now/1",
    "NaiveDateTime.utc_now/0",
    "NaiveDateTime.local_now/0",
    "Date.utc_today/0",
    "Time.utc_now/0",
    "System.get_env/0",
    "System.get_env/1",
    "System.fetch_env/1",
    "System.monotonic_time/0",
    "System.monotonic_time/1",
    "System.system_time/0",
    "System.system_time/1",
    "System.os_time/0",
    "System.unique_integer/0",
    "System.unique_integer/1",
    "System.argv/0",
    "System.user_home/0",
    "System.tmp_dir/0",
    "System.schedulers_online/0",
    "Process.get/0",
    "Process.get/1",
    "Process.get/2",
    "Process.alive?/1",
    "Process.whereis/1",
    "Process.list/0",
    "Process.info/1",
    "Kernel.self/0",
    "Kernel.node/0",
    "Kernel.make_ref/0",
    "Application.get_env/2",
    "Application.get_env/3",
    "Application.fetch_env/2",
    "Application.get_all_env/1",
    "Enum.random/1",
    "Enum.take_random/2",
    "Enum.shuffle/1",
    ":erlang.system_time/0",
    ":erlang.monotonic_time/0",
    ":erlang.unique_integer/0",
    ":erlang.node/0",
    ":erlang.nodes/0",
    ":erlang.self/0",
    ":erlang.memory/0",
    ":os.timestamp/0",
    ":os.getenv/1",
    ":os.type/0",
    ":os.system_time/0",
    ":rand.uniform/0",
    ":rand.uniform/1",
    ":rand.normal/0",
    ":ets.lookup/2",
    ":ets.member/2",
    ":ets.tab2list/1",
    ":persistent_term.get/1",
    ":persistent_term.get/2",
];

/// Console and device I/O.
const SIDE_IO: &[&str] = &[
    "IO.puts/1",
    "IO.puts/2",
    "IO.write/1",
    "IO.write/2",
    "IO.inspect/1",
    "IO.inspect/2",
    "IO.inspect/3",
    "IO.gets/1",
    "IO.gets/2",
    "IO.read/2",
    "IO.warn/1",
    "IO.warn/2",
    "IO.binwrite/2",
    "IO.stream/2",
    "Logger.debug/1",
    "Logger.info/1",
    "Logger.warning/1",
    "Logger.error/1",
    "Logger.log/2",
];

/// Filesystem reads and writes.
const SIDE_FS: &[&str] = &[
    "File.read/1",
    "File.write/2",
    "File.write/3",
    "File.rm/1",
    "File.rm_rf/1",
    "File.mkdir/1",
    "File.mkdir_p/1",
    "File.cp/2",
    "File.cp_r/2",
    "File.rename/2",
    "File.stat/1",
    "File.lstat/1",
    "File.exists?/1",
    "File.dir?/1",
    "File.regular?/1",
    "File.ls/1",
    "File.open/1",
    "File.open/2",
    "File.close/1",
    "File.stream!/1",
    "File.stream!/2",
    "File.touch/1",
    "File.chmod/2",
    "Path.wildcard/1",
    ":file.read_file/1",
    ":file.write_file/2",
    ":file.delete/1",
    ":file.list_dir/1",
];

/// Process operations: spawning, messaging, registration.
const SIDE_PROCESS: &[&str] = &[
    "Kernel.send/2",
    "Kernel.spawn/1",
    "Kernel.spawn/3",
    "Kernel.spawn_link/1",
    "Kernel.spawn_link/3",
    "Process.send/3",
    "Process.send_after/3",
    "Process.put/2",
    "Process.delete/1",
    "Process.exit/2",
    "Process.sleep/1",
    "Process.link/1",
    "Process.unlink/1",
    "Process.monitor/1",
    "Process.demonitor/1",
    "Process.register/2",
    "Process.unregister/1",
    "Process.flag/2",
    "Agent.start_link/1",
    "Agent.start_link/2",
    "Agent.get/2",
    "Agent.get/3",
    "Agent.update/2",
    "Agent.update/3",
    "Agent.cast/2",
    "Agent.stop/1",
    "GenServer.start_link/2",
    "GenServer.start_link/3",
    "GenServer.call/2",
    "GenServer.call/3",
    "GenServer.cast/2",
    "GenServer.stop/1",
    "GenServer.reply/2",
    "Task.async/1",
    "Task.async/3",
    "Task.await/1",
    "Task.await/2",
    "Task.start/1",
    "Task.start_link/1",
    "Task.yield/2",
    "Task.shutdown/1",
    ":erlang.send/2",
    ":erlang.spawn/1",
    ":erlang.spawn/3",
    ":erlang.exit/1",
    ":erlang.exit/2",
    ":erlang.garbage_collect/0",
];

/// Mutable shared state and other observable operations.
const SIDE_STATE: &[&str] = &[
    "System.put_env/2",
    "System.delete_env/1",
    "System.cmd/2",
    "System.cmd/3",
    "System.shell/1",
    "System.halt/0",
    "System.halt/1",
    "System.stop/0",
    "Application.put_env/3",
    "Application.put_env/4",
    "Application.delete_env/2",
    "Application.ensure_all_started/1",
    "Application.stop/1",
    "String.to_atom/1",
    "Code.compile_string/1",
    "Code.require_file/1",
    "Code.append_path/1",
    ":ets.new/2",
    ":ets.insert/2",
    ":ets.insert_new/2",
    ":ets.delete/1",
    ":ets.delete/2",
    ":ets.update_counter/3",
    ":ets.update_element/3",
    ":persistent_term.put/2",
    ":persistent_term.erase/1",
    ":os.cmd/1",
    ":erlang.put/2",
    ":erlang.erase/1",
];

/// Operations that raise, with the exception types they raise.
const EXCEPTION: &[(&str, &[&str])] = &[
    ("Map.fetch!/2", &["KeyError"]),
    ("Keyword.fetch!/2", &["KeyError"]),
    ("Enum.fetch!/2", &["Enum.OutOfBoundsError"]),
    ("Enum.min/1", &["Enum.EmptyError"]),
    ("Enum.max/1", &["Enum.EmptyError"]),
    ("Enum.min_max/1", &["Enum.EmptyError"]),
    ("List.first!/1", &["ArgumentError"]),
    ("String.to_integer/1", &["ArgumentError"]),
    ("String.to_float/1", &["ArgumentError"]),
    ("String.to_existing_atom/1", &["ArgumentError"]),
    ("Integer.parse!/1", &["ArgumentError"]),
    ("Kernel.div/2", &["ArithmeticError"]),
    ("Kernel.rem!/2", &["ArithmeticError"]),
    ("Kernel.binary_part/3", &["ArgumentError"]),
    ("Kernel.struct!/2", &["ArgumentError", "KeyError"]),
    ("Access.fetch!/2", &["KeyError"]),
    ("Date.from_iso8601!/1", &["ArgumentError"]),
    ("DateTime.from_iso8601!/1", &["ArgumentError"]),
    ("NaiveDateTime.from_iso8601!/1", &["ArgumentError"]),
    ("URI.new!/1", &["URI.Error"]),
    ("Version.parse!/1", &["Version.InvalidVersionError"]),
    (":erlang.binary_to_term/1", &["ArgumentError"]),
    (":erlang.list_to_integer/1", &["ArgumentError"]),
    (":erlang.binary_to_integer/1", &["ArgumentError"]),
];

/// Native-implemented operations.
const NIF: &[&str] = &[
    ":crypto.strong_rand_bytes/1",
    ":crypto.hash/2",
    ":crypto.mac/4",
    ":crypto.crypto_one_time/5",
    ":zlib.compress/1",
    ":zlib.uncompress/1",
    ":zlib.gzip/1",
    ":zlib.gunzip/1",
    ":erlang.md5/1",
    ":erlang.crc32/1",
    ":math.pow/2",
    ":math.sqrt/1",
    ":math.log/1",
    ":math.exp/1",
    ":math.sin/1",
    ":math.cos/1",
];

/// Operations whose concrete effect is unknowable statically.
const UNKNOWN: &[&str] = &[
    "Kernel.apply/2",
    "Kernel.apply/3",
    ":erlang.apply/2",
    ":erlang.apply/3",
    "Code.eval_string/1",
    "Code.eval_string/2",
    "Code.eval_quoted/1",
];

/// Convenience wrappers and the chains to the operations they delegate
/// to. The wrapper keeps its own effect; the chain feeds
/// `resolve_to_leaves`.
const RESOLVE: &[(&str, &[&str])] = &[
    ("File.read!/1", &["File.read/1"]),
    ("File.write!/2", &["File.write/2"]),
    ("File.write!/3", &["File.write/3"]),
    ("File.rm!/1", &["File.rm/1"]),
    ("File.mkdir!/1", &["File.mkdir/1"]),
    ("File.cp!/2", &["File.cp/2"]),
    ("File.ls!/1", &["File.ls/1"]),
    ("File.open!/1", &["File.open/1"]),
    ("File.open!/2", &["File.open/2"]),
    ("File.stat!/1", &["File.stat/1"]),
    ("System.fetch_env!/1", &["System.fetch_env/1"]),
    ("Application.fetch_env!/2", &["Application.fetch_env/2"]),
    ("Task.await_many/1", &["Task.await/1"]),
    ("Agent.get_and_update/2", &["Agent.get/2", "Agent.update/2"]),
];

fn parse(key: &str) -> Mfa {
    key.parse().unwrap_or_else(|e| panic!("builtin table: {e}"))
}

fn side_entry(key: &str) -> (Mfa, RegistryEntry) {
    let mfa = parse(key);
    let entry = RegistryEntry::new(CompactEffect::Side(vec![mfa.clone()]));
    (mfa, entry)
}

static BUILTINS: Lazy<Vec<(Mfa, RegistryEntry)>> = Lazy::new(|| {
    let mut table = Vec::new();
    for key in PURE.iter().chain(ENUM_PURE) {
        table.push((parse(key), RegistryEntry::new(CompactEffect::Pure)));
    }
    for key in LAMBDA {
        table.push((parse(key), RegistryEntry::new(CompactEffect::Lambda)));
    }
    for key in DEPENDENT {
        let mfa = parse(key);
        let entry = RegistryEntry::new(CompactEffect::Dependent(vec![mfa.clone()]));
        table.push((mfa, entry));
    }
    for key in SIDE_IO
        .iter()
        .chain(SIDE_FS)
        .chain(SIDE_PROCESS)
        .chain(SIDE_STATE)
    {
        table.push(side_entry(key));
    }
    for (key, types) in EXCEPTION {
        let effect = CompactEffect::Exception(
            types
                .iter()
                .map(|name| ExceptionType::named(*name))
                .collect(),
        );
        table.push((parse(key), RegistryEntry::new(effect)));
    }
    for key in NIF {
        let mfa = parse(key);
        let entry = RegistryEntry::new(CompactEffect::Nif(vec![mfa.clone()]));
        table.push((mfa, entry));
    }
    for key in UNKNOWN {
        table.push((parse(key), RegistryEntry::new(CompactEffect::Unknown)));
    }
    // Wrapper chains: the wrapper inherits the severity-combined effect of
    // its children and declares the chain
    for (key, children) in RESOLVE {
        let mfa = parse(key);
        let child_mfas: Vec<Mfa> = children.iter().map(|c| parse(c)).collect();
        let effect = child_mfas
            .iter()
            .filter_map(|child| {
                table
                    .iter()
                    .find(|(m, _)| m == child)
                    .map(|(_, e)| e.effect.clone())
            })
            .fold(CompactEffect::Pure, |acc, e| acc.combine(&e));
        table.push((mfa, RegistryEntry::with_resolve(effect, child_mfas)));
    }
    table
});

/// The built-in table as `(mfa, entry)` pairs.
pub fn builtin_entries() -> Vec<(Mfa, RegistryEntry)> {
    BUILTINS.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Severity;

    #[test]
    fn test_table_parses_and_is_duplicate_free() {
        let entries = builtin_entries();
        assert!(entries.len() > 400);
        let mut seen = std::collections::HashSet::new();
        for (mfa, _) in &entries {
            assert!(seen.insert(mfa.clone()), "duplicate builtin {mfa}");
        }
    }

    #[test]
    fn test_side_entries_carry_themselves() {
        let entries = builtin_entries();
        let (mfa, entry) = entries
            .iter()
            .find(|(m, _)| m.to_string() == "File.write/3")
            .unwrap();
        assert_eq!(entry.effect, CompactEffect::Side(vec![mfa.clone()]));
    }

    #[test]
    fn test_identity_is_pure_not_lambda() {
        // identity passes a plain value through; it takes no function
        // argument
        let entries = builtin_entries();
        let (_, entry) = entries
            .iter()
            .find(|(m, _)| m.to_string() == "Function.identity/1")
            .unwrap();
        assert_eq!(entry.effect, CompactEffect::Pure);
    }

    #[test]
    fn test_apply_is_unknown() {
        let entries = builtin_entries();
        let (_, entry) = entries
            .iter()
            .find(|(m, _)| m.to_string() == "Kernel.apply/3")
            .unwrap();
        assert_eq!(entry.effect, CompactEffect::Unknown);
    }

    #[test]
    fn test_wrappers_inherit_child_severity() {
        let entries = builtin_entries();
        let (_, entry) = entries
            .iter()
            .find(|(m, _)| m.to_string() == "File.read!/1")
            .unwrap();
        assert_eq!(entry.effect.severity(), Severity::Side);
        assert_eq!(entry.resolve, vec!["File.read/1".parse::<Mfa>().unwrap()]);
    }
}
