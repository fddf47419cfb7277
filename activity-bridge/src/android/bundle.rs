//! Conversion between `android.os.Bundle` and [`Bundle`].

use jni::{
    errors::Result,
    objects::{JObject, JObjectArray, JValue},
    JNIEnv,
};

use super::jni_utils::java_string;
use crate::{Bundle, BundleValue};

/// Copies the entries of a Java bundle, which may be null.
///
/// Values of types other than boolean, int, string and string list are
/// skipped.
pub(crate) fn from_java(env: &mut JNIEnv, bundle: &JObject) -> Result<Bundle> {
    let mut out = Bundle::new();
    if bundle.is_null() {
        return Ok(out);
    }

    let keys = env
        .call_method(bundle, "keySet", "()Ljava/util/Set;", &[])?
        .l()?;
    let keys = JObjectArray::from(
        env.call_method(&keys, "toArray", "()[Ljava/lang/Object;", &[])?
            .l()?,
    );
    let len = env.get_array_length(&keys)?;

    for i in 0..len {
        let key_object = env.get_object_array_element(&keys, i)?;
        let key = match java_string(env, key_object)? {
            Some(key) => key,
            None => continue,
        };

        let jkey = env.new_string(&key)?;
        let value = env
            .call_method(
                bundle,
                "get",
                "(Ljava/lang/String;)Ljava/lang/Object;",
                &[JValue::Object(&jkey)],
            )?
            .l()?;

        match value_from_java(env, &value)? {
            Some(Some(value)) => out.insert(key, value),
            Some(None) => out.insert_null(key),
            None => log::trace!("Skipping bundle entry '{key}' of unsupported type"),
        }

        env.delete_local_ref(value)?;
        env.delete_local_ref(jkey)?;
    }

    Ok(out)
}

/// `None` for unsupported types, `Some(None)` for null.
fn value_from_java(env: &mut JNIEnv, value: &JObject) -> Result<Option<Option<BundleValue>>> {
    if value.is_null() {
        return Ok(Some(None));
    }

    let value = if env.is_instance_of(value, "java/lang/Boolean")? {
        BundleValue::Bool(env.call_method(value, "booleanValue", "()Z", &[])?.z()?)
    } else if env.is_instance_of(value, "java/lang/Integer")? {
        BundleValue::Int(env.call_method(value, "intValue", "()I", &[])?.i()?)
    } else if env.is_instance_of(value, "java/lang/String")? {
        let string = env.call_method(value, "toString", "()Ljava/lang/String;", &[])?.l()?;
        BundleValue::String(java_string(env, string)?.unwrap_or_default())
    } else if env.is_instance_of(value, "java/util/List")? {
        let len = env.call_method(value, "size", "()I", &[])?.i()?;
        let mut list = Vec::with_capacity(len.max(0) as usize);
        for i in 0..len {
            let item = env
                .call_method(value, "get", "(I)Ljava/lang/Object;", &[JValue::Int(i)])?
                .l()?;
            if !item.is_null() && !env.is_instance_of(&item, "java/lang/String")? {
                return Ok(None);
            }
            list.push(java_string(env, item)?.unwrap_or_default());
        }
        BundleValue::StringList(list)
    } else {
        return Ok(None);
    };

    Ok(Some(Some(value)))
}

/// Stores every entry of `bundle` in the Java bundle `out`.
pub(crate) fn put_into(env: &mut JNIEnv, bundle: &Bundle, out: &JObject) -> Result<()> {
    for (key, value) in bundle.iter() {
        let jkey = env.new_string(key)?;
        let key_arg = JValue::Object(&jkey);
        match value {
            None => {
                env.call_method(
                    out,
                    "putString",
                    "(Ljava/lang/String;Ljava/lang/String;)V",
                    &[key_arg, JValue::Object(&JObject::null())],
                )?;
            }
            Some(BundleValue::Bool(value)) => {
                env.call_method(
                    out,
                    "putBoolean",
                    "(Ljava/lang/String;Z)V",
                    &[key_arg, JValue::Bool(u8::from(*value))],
                )?;
            }
            Some(BundleValue::Int(value)) => {
                env.call_method(
                    out,
                    "putInt",
                    "(Ljava/lang/String;I)V",
                    &[key_arg, JValue::Int(*value)],
                )?;
            }
            Some(BundleValue::String(value)) => {
                let jvalue = env.new_string(value)?;
                env.call_method(
                    out,
                    "putString",
                    "(Ljava/lang/String;Ljava/lang/String;)V",
                    &[key_arg, JValue::Object(&jvalue)],
                )?;
            }
            Some(BundleValue::StringList(values)) => {
                let list = env.new_object(
                    "java/util/ArrayList",
                    "(I)V",
                    &[JValue::Int(values.len() as i32)],
                )?;
                for value in values {
                    let jvalue = env.new_string(value)?;
                    env.call_method(
                        &list,
                        "add",
                        "(Ljava/lang/Object;)Z",
                        &[JValue::Object(&jvalue)],
                    )?;
                    env.delete_local_ref(jvalue)?;
                }
                env.call_method(
                    out,
                    "putStringArrayList",
                    "(Ljava/lang/String;Ljava/util/ArrayList;)V",
                    &[key_arg, JValue::Object(&list)],
                )?;
            }
        }
    }
    Ok(())
}
