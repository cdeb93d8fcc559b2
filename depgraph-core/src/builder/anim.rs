//! Animation data, drivers and actions.

use super::{BuildContext, BuildTag, GraphBuilder};
use crate::graph::{NodeType, OperationCode, OperationIdKey};
use crate::scene::{Datablock, Driver};

impl GraphBuilder<'_> {
    /// Animation component and drivers of `block`.
    pub(super) fn build_animdata(&mut self, ctx: BuildContext, block: &Datablock) {
        let Some(anim) = &block.anim else {
            return;
        };
        if let Some(action) = anim.action {
            self.visit_id(ctx, action);
        }
        if anim.has_animation() {
            let entry =
                self.add_operation_node(block, NodeType::Animation, OperationCode::AnimationEntry);
            self.set_entry(entry);
            self.add_operation_node(block, NodeType::Animation, OperationCode::AnimationEval);
            let exit =
                self.add_operation_node(block, NodeType::Animation, OperationCode::AnimationExit);
            self.set_exit(exit);

            for action in &anim.nla_actions {
                self.visit_id(ctx, *action);
            }
        }
        for driver in &anim.drivers {
            self.build_driver(block, driver);
            self.build_driver_variables(ctx, driver);
        }
    }

    /// Scene animation is reached from both the view layer and the set
    /// scene recursion; build it once.
    pub(super) fn build_animdata_once(&mut self, ctx: BuildContext, block: &Datablock) {
        if self.built.check_is_built_and_tag(block.uuid, BuildTag::ANIMATION) {
            return;
        }
        self.build_animdata(ctx, block);
    }

    fn build_driver(&mut self, block: &Datablock, driver: &Driver) {
        let key = OperationIdKey::new(
            OperationCode::Driver,
            driver.rna_path.as_str(),
            driver.array_index,
        );
        self.add_operation_node(block, NodeType::Parameters, key);
    }

    fn build_driver_variables(&mut self, ctx: BuildContext, driver: &Driver) {
        for variable in &driver.variables {
            for target in &variable.targets {
                self.visit_id(ctx, *target);
            }
        }
    }

    pub(super) fn build_action(&mut self, block: &Datablock) {
        if self.built.check_is_built_and_tag(block.uuid, BuildTag::COMPLETE) {
            return;
        }
        self.add_operation_node(block, NodeType::Animation, OperationCode::AnimationEval);
    }
}
