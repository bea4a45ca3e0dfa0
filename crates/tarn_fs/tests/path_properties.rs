use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use std::path::PathBuf;
use tarn_core::{Op, Value, Vm};
use tarn_fs::{open_filesystem, tag};

fn any_lexical_path() -> impl Strategy<Value = String> {
    let segment = prop_oneof![
        Just("a".to_string()),
        Just("b".to_string()),
        Just("long_name".to_string()),
        Just(".".to_string()),
        Just("..".to_string()),
    ];
    (any::<bool>(), proptest::collection::vec(segment, 1..6)).prop_map(|(rooted, segs)| {
        let body = segs.join("/");
        if rooted {
            format!("/{body}")
        } else {
            body
        }
    })
}

fn normalized(vm: &mut Vm, exports: &tarn_fs::ModuleExports, s: &str) -> PathBuf {
    let make = exports.function("path").unwrap();
    let p = make(vm, &[Value::str(s)]).unwrap()[0].clone();
    let n = vm.call_method(&p, "lexically_normal", &[]).unwrap();
    vm.foreign::<PathBuf>(&n[0], tag::PATH).cloned().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64, .. ProptestConfig::default()
    })]

    #[test]
    fn construction_and_stringification_round_trip(s in any_lexical_path()) {
        let mut vm = Vm::new();
        let exports = open_filesystem(&mut vm);
        let make = exports.function("path").unwrap();
        let p = make(&mut vm, &[Value::str(&s)]).unwrap()[0].clone();
        let r = vm.call_operator(Op::ToString, &[p]).unwrap();
        prop_assert_eq!(r[0].as_str().unwrap(), s.as_str());
    }

    #[test]
    fn normal_form_is_idempotent(s in any_lexical_path()) {
        let mut vm = Vm::new();
        let exports = open_filesystem(&mut vm);
        let once = normalized(&mut vm, &exports, &s);
        let twice = normalized(&mut vm, &exports, once.to_str().unwrap());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normal_form_has_no_current_dir_and_no_interior_parent(s in any_lexical_path()) {
        let mut vm = Vm::new();
        let exports = open_filesystem(&mut vm);
        let n = normalized(&mut vm, &exports, &s);
        let parts: Vec<_> = n.components().collect();
        let mut leading = true;
        for c in &parts {
            match c {
                std::path::Component::CurDir => {
                    // Only the sole "." form survives.
                    prop_assert_eq!(parts.len(), 1);
                }
                std::path::Component::ParentDir => {
                    prop_assert!(leading, "interior .. in {:?}", n);
                }
                std::path::Component::RootDir | std::path::Component::Prefix(_) => {}
                std::path::Component::Normal(_) => leading = false,
            }
        }
    }

    #[test]
    fn a_path_is_relative_to_itself(s in any_lexical_path()) {
        let mut vm = Vm::new();
        let exports = open_filesystem(&mut vm);
        let make = exports.function("path").unwrap();
        let p = make(&mut vm, &[Value::str(&s)]).unwrap()[0].clone();
        let r = vm
            .call_method(&p, "lexically_relative", &[Value::str(&s)])
            .unwrap();
        let rel = vm.foreign::<PathBuf>(&r[0], tag::PATH).cloned().unwrap();
        prop_assert_eq!(rel, PathBuf::from("."));
    }

    #[test]
    fn relative_form_rejoins_to_the_original(s in any_lexical_path(), base in any_lexical_path()) {
        // Only lexically clean inputs rejoin exactly; ".." in the base can
        // make the relative form undefined (empty), which is fine to skip.
        let mut vm = Vm::new();
        let exports = open_filesystem(&mut vm);
        let make = exports.function("path").unwrap();

        let s_norm = normalized(&mut vm, &exports, &s);
        let base_norm = normalized(&mut vm, &exports, base.as_str());
        prop_assume!(s_norm.is_absolute() == base_norm.is_absolute());
        prop_assume!(!s_norm.components().any(|c| c == std::path::Component::ParentDir));
        prop_assume!(!base_norm.components().any(|c| c == std::path::Component::ParentDir));

        let p = make(&mut vm, &[Value::str(s_norm.to_str().unwrap())]).unwrap()[0].clone();
        let r = vm
            .call_method(&p, "lexically_relative", &[Value::str(base_norm.to_str().unwrap())])
            .unwrap();
        let rel = vm.foreign::<PathBuf>(&r[0], tag::PATH).cloned().unwrap();
        prop_assume!(!rel.as_os_str().is_empty());

        let rejoined = normalized(
            &mut vm,
            &exports,
            base_norm.join(&rel).to_str().unwrap(),
        );
        prop_assert_eq!(rejoined, s_norm);
    }

    #[test]
    fn element_cursor_visits_every_component(s in any_lexical_path()) {
        let mut vm = Vm::new();
        let exports = open_filesystem(&mut vm);
        let make = exports.function("path").unwrap();
        let p = make(&mut vm, &[Value::str(&s)]).unwrap()[0].clone();
        let pair = vm.call_method(&p, "elements", &[]).unwrap();
        let (cont, state) = (pair[0].clone(), pair[1].clone());
        let step = match cont {
            Value::Native(f) => f,
            _ => panic!("continuation is not callable"),
        };
        let mut walked = Vec::new();
        loop {
            let r = step(&mut vm, &[state.clone(), Value::Nil]).unwrap();
            if r[0].is_nil() {
                break;
            }
            walked.push(vm.foreign::<PathBuf>(&r[0], tag::PATH).cloned().unwrap());
        }
        let expected: Vec<PathBuf> = PathBuf::from(&s)
            .components()
            .map(|c| PathBuf::from(c.as_os_str()))
            .collect();
        prop_assert_eq!(walked, expected);
    }
}
