use quadfall::c_api::*;
use quadfall::{Body, Region};

#[test]
fn handle_lifecycle() {
    let handle = Simulation_Create(400.0, 300.0, 2.0, 4.0, 8, 50.0, 200.0, 40.0);
    assert!(!handle.is_null());

    unsafe {
        assert_eq!(Simulation_GetBodyCount(handle), 8);

        for expected in 0..8 {
            assert_eq!(Simulation_ActivateNext(handle), expected);
            Simulation_Step(handle, 1.0 / 60.0);
        }
        assert_eq!(Simulation_ActivateNext(handle), -1);

        let bodies: &[Body] = std::slice::from_raw_parts(Simulation_GetBodies(handle), 8);
        assert!(bodies.iter().all(|b| b.is_active()));

        assert!(Simulation_SetSpeedModifier(handle, 0.01));
        assert!(!Simulation_SetSpeedModifier(handle, -2.0));
        assert_eq!(Simulation_GetSpeedModifier(handle), 0.01);

        let mut out = [u32::MAX; 16];
        let total = Simulation_QueryCandidates(handle, 0, out.as_mut_ptr(), out.len());
        assert!(total <= 7);
        assert!(out[..total].iter().all(|&j| j != 0 && j < 8));
        assert_eq!(Simulation_QueryCandidates(handle, 99, out.as_mut_ptr(), out.len()), 0);

        let nodes = Simulation_GetNodeCount(handle);
        assert!(nodes >= 1);
        let mut root = Region::new(0.0, 0.0, 0.0, 0.0);
        assert!(Simulation_GetNodeRegion(handle, 0, &mut root));
        assert_eq!(root, Region::new(0.0, 0.0, 400.0, 300.0));
        assert!(!Simulation_GetNodeRegion(handle, nodes, &mut root));

        Simulation_SetPaused(handle, true);
        let before = (*Simulation_GetBodies(handle)).pos;
        Simulation_Step(handle, 1.0 / 60.0);
        assert_eq!((*Simulation_GetBodies(handle)).pos, before);

        Simulation_Destroy(handle);
    }
}

#[test]
fn rejected_parameters_give_a_null_handle() {
    let handle = Simulation_Create(400.0, 300.0, 6.0, 2.0, 8, 50.0, 200.0, 40.0);
    assert!(handle.is_null());

    unsafe {
        // Every entry point tolerates a null handle.
        Simulation_Step(handle, 0.1);
        assert_eq!(Simulation_GetBodyCount(handle), 0);
        assert!(Simulation_GetBodies(handle).is_null());
        assert_eq!(Simulation_ActivateNext(handle), -1);
        assert!(!Simulation_SetSpeedModifier(handle, 1.0));
        Simulation_Destroy(handle);
    }
}
