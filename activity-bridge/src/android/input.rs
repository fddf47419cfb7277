//! Snapshots of Java `MotionEvent` and `KeyEvent` objects.

use jni::{
    errors::Result,
    objects::{JObject, JValue},
    JNIEnv,
};

use super::jni_utils::java_string;
use crate::input::{KeyInput, MetaState, MotionSnapshot, PointerSample};

/// `KeyEvent.ACTION_MULTIPLE`
pub(crate) const KEY_ACTION_MULTIPLE: i32 = 2;

fn pointer_float(env: &mut JNIEnv, event: &JObject, method: &str, index: i32) -> Result<f32> {
    env.call_method(event, method, "(I)F", &[JValue::Int(index)])?.f()
}

pub(crate) fn motion_snapshot(env: &mut JNIEnv, event: &JObject) -> Result<MotionSnapshot> {
    let action = env.call_method(event, "getAction", "()I", &[])?.i()?;
    let pointer_count = env.call_method(event, "getPointerCount", "()I", &[])?.i()?;
    let history_size = env.call_method(event, "getHistorySize", "()I", &[])?.i()?;

    let mut pointers = Vec::with_capacity(pointer_count.max(0) as usize);
    for index in 0..pointer_count {
        let pointer_id = env
            .call_method(event, "getPointerId", "(I)I", &[JValue::Int(index)])?
            .i()?;
        let x = pointer_float(env, event, "getX", index)?;
        let y = pointer_float(env, event, "getY", index)?;
        let size = pointer_float(env, event, "getSize", index)?;
        let pressure = pointer_float(env, event, "getPressure", index)?;

        let mut pointer = PointerSample::new(pointer_id, x, y).with_contact(size, pressure);
        if history_size > 0 {
            let last = [JValue::Int(index), JValue::Int(history_size - 1)];
            let hx = env.call_method(event, "getHistoricalX", "(II)F", &last)?.f()?;
            let hy = env.call_method(event, "getHistoricalY", "(II)F", &last)?.f()?;
            pointer = pointer.with_history(hx, hy);
        }
        pointers.push(pointer);
    }

    Ok(MotionSnapshot::new(action as u32, pointers))
}

pub(crate) fn key_input(env: &mut JNIEnv, key_code: i32, event: &JObject) -> Result<KeyInput> {
    let unicode = env.call_method(event, "getUnicodeChar", "()I", &[])?.i()?;
    let meta_state = event_meta_state(env, event)?;
    Ok(KeyInput::new(key_code, unicode as u32, meta_state))
}

pub(crate) fn event_meta_state(env: &mut JNIEnv, event: &JObject) -> Result<MetaState> {
    let meta_state = env.call_method(event, "getMetaState", "()I", &[])?.i()?;
    Ok(MetaState::from_bits_retain(meta_state as u32))
}

/// The action, key code and characters of a key event.
pub(crate) fn key_event_characters(
    env: &mut JNIEnv,
    event: &JObject,
) -> Result<(i32, i32, Option<String>)> {
    let action = env.call_method(event, "getAction", "()I", &[])?.i()?;
    let key_code = env.call_method(event, "getKeyCode", "()I", &[])?.i()?;
    let characters = env
        .call_method(event, "getCharacters", "()Ljava/lang/String;", &[])?
        .l()?;
    Ok((action, key_code, java_string(env, characters)?))
}
